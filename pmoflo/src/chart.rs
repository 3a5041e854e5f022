//! Stateful chart holder
//!
//! [`FloChart`] owns a client and keeps the last successfully parsed
//! [`ChartSnapshot`]. A refresh either swaps in a complete new snapshot or
//! leaves the previous one in place and returns the error.
//!
//! ```no_run
//! use pmoflo::FloChart;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chart = FloChart::with_defaults()?;
//!     for entry in &chart {
//!         println!("{}. {} - {}", entry.rank, entry.artist, entry.title);
//!     }
//!     Ok(())
//! }
//! ```

use crate::client::FloClient;
use crate::config::{FloConfig, DEFAULT_IMAGE_SIZE};
use crate::error::{Error, Result};
use crate::models::{to_sorted_json, ChartEntry, ChartSnapshot};
use crate::parser;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use std::ops::Index;

/// Where a [`FloChart`] stands after its last fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    /// Nothing fetched yet
    Empty,
    /// Last fetch succeeded
    Populated,
    /// Last fetch failed; an earlier snapshot may still be held
    Failed,
}

/// The FLO chart, fetched on demand
#[derive(Debug, Clone)]
pub struct FloChart {
    client: FloClient,
    image_size: u32,
    snapshot: Option<ChartSnapshot>,
    state: ChartState,
}

/// Shape written by [`FloChart::to_json`] before anything was fetched
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmptyChart<'a> {
    image_size: u32,
    entries: &'a [ChartEntry],
}

impl FloChart {
    /// Create a chart without fetching it
    pub fn new(client: FloClient, image_size: u32) -> Self {
        Self {
            client,
            image_size,
            snapshot: None,
            state: ChartState::Empty,
        }
    }

    /// Create a chart and fetch it immediately
    pub fn fetched(client: FloClient, image_size: u32) -> Result<Self> {
        let mut chart = Self::new(client, image_size);
        chart.fetch_entries()?;
        Ok(chart)
    }

    /// Fetch the public chart with default settings
    pub fn with_defaults() -> Result<Self> {
        Self::fetched(FloClient::new(), DEFAULT_IMAGE_SIZE)
    }

    /// Build an unfetched chart from a configuration
    pub fn from_config(config: &FloConfig) -> Self {
        Self::new(FloClient::from_config(config), config.image_size)
    }

    /// Fetch and parse the chart, replacing the current snapshot on success
    ///
    /// On failure the previous snapshot, if any, is kept and the error is
    /// returned.
    pub fn fetch_entries(&mut self) -> Result<&ChartSnapshot> {
        let outcome = self
            .client
            .fetch()
            .and_then(|raw| Ok(parser::parse(&raw, self.image_size)?));
        self.install(outcome)
    }

    /// Same as [`FloChart::fetch_entries`]
    pub fn refresh(&mut self) -> Result<&ChartSnapshot> {
        self.fetch_entries()
    }

    /// Parse an already fetched payload, e.g. a cached response
    ///
    /// The chart date is computed now, not taken from the payload.
    pub fn load_from_value(&mut self, raw: &Value) -> Result<&ChartSnapshot> {
        let outcome = parser::parse(raw, self.image_size).map_err(Error::from);
        self.install(outcome)
    }

    fn install(&mut self, outcome: Result<ChartSnapshot>) -> Result<&ChartSnapshot> {
        match outcome {
            Ok(snapshot) => {
                self.state = ChartState::Populated;
                Ok(self.snapshot.insert(snapshot))
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("FLO chart update failed, keeping previous snapshot: {}", e);

                self.state = ChartState::Failed;
                Err(e)
            }
        }
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn client(&self) -> &FloClient {
        &self.client
    }

    /// Last successfully parsed snapshot
    pub fn snapshot(&self) -> Option<&ChartSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    pub fn name(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.name.as_str())
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.snapshot.as_ref().map(|s| s.date)
    }

    /// Entries of the current snapshot, empty before the first fetch
    pub fn entries(&self) -> &[ChartEntry] {
        self.snapshot
            .as_ref()
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChartEntry> {
        self.entries().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChartEntry> {
        self.entries().iter()
    }

    /// Pretty JSON of the current snapshot, keys sorted
    pub fn to_json(&self) -> Result<String> {
        match &self.snapshot {
            Some(snapshot) => snapshot.to_json(),
            None => to_sorted_json(&EmptyChart {
                image_size: self.image_size,
                entries: &[],
            }),
        }
    }
}

impl Index<usize> for FloChart {
    type Output = ChartEntry;

    fn index(&self, index: usize) -> &ChartEntry {
        &self.entries()[index]
    }
}

impl<'a> IntoIterator for &'a FloChart {
    type Item = &'a ChartEntry;
    type IntoIter = std::slice::Iter<'a, ChartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
