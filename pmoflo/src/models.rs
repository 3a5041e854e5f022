//! Data models for the FLO chart
//!
//! [`raw`] mirrors the upstream payload with every field optional, so a
//! missing key can be reported by name. [`ChartEntry`] and [`ChartSnapshot`]
//! are the validated, immutable results.

use crate::error::{ParseError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Upstream payload
// ============================================================================

/// Upstream JSON structures, as sent by `display/v1/browser/chart/1/list`
pub mod raw {
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ChartResponse {
        pub data: Option<ChartData>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ChartData {
        pub name: Option<String>,
        pub track_list: Option<Vec<Track>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Track {
        pub name: Option<String>,
        pub representation_artist: Option<Artist>,
        pub album: Option<Album>,
        pub rank: Option<Rank>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Artist {
        pub name: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Album {
        pub img_list: Option<Vec<Image>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Image {
        pub url: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Rank {
        /// Signed rank change, usually a numeric string ("3", "-1", "0")
        pub rank_badge: Option<Value>,
        /// "Y" when the track entered the chart this period
        pub new_yn: Option<String>,
    }
}

// ============================================================================
// Chart models
// ============================================================================

/// One track on the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Track title
    pub title: String,
    /// Representative artist name
    pub artist: String,
    /// Cover image URL, resized to the chart's image size
    pub image: String,
    /// Current position, starting at 1
    pub rank: u32,
    /// Position on the previous period
    pub last_pos: i64,
    /// Whether the track is new to the chart
    pub is_new: bool,
}

impl ChartEntry {
    /// Pretty JSON with sorted keys
    pub fn to_json(&self) -> Result<String> {
        to_sorted_json(self)
    }

    /// Signed number of places gained since the previous period
    pub fn movement(&self) -> i64 {
        self.last_pos - i64::from(self.rank)
    }
}

/// One fetched-and-parsed chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    /// Chart name as published by FLO
    pub name: String,
    /// Chart date: the latest 22:00 boundary at parse time (local time)
    pub date: NaiveDateTime,
    /// Edge length of cover images, in pixels
    pub image_size: u32,
    /// Entries in rank order
    pub entries: Vec<ChartEntry>,
}

impl ChartSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a zero-based position
    pub fn get(&self, index: usize) -> Option<&ChartEntry> {
        self.entries.get(index)
    }

    /// Entry holding a given 1-based rank
    pub fn by_rank(&self, rank: u32) -> Option<&ChartEntry> {
        let index = usize::try_from(rank).ok()?.checked_sub(1)?;
        self.entries.get(index)
    }

    /// Entries flagged as new this period
    pub fn new_entries(&self) -> impl Iterator<Item = &ChartEntry> {
        self.entries.iter().filter(|e| e.is_new)
    }

    /// Pretty JSON with sorted keys and unescaped non-ASCII text
    pub fn to_json(&self) -> Result<String> {
        to_sorted_json(self)
    }

    /// Read back a document produced by [`ChartSnapshot::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json).map_err(ParseError::Json)?)
    }
}

/// Serialize with map keys sorted at every level, pretty-printed with a
/// 4-space indent.
pub(crate) fn to_sorted_json<T: Serialize>(value: &T) -> Result<String> {
    let value = sort_keys(serde_json::to_value(value).map_err(ParseError::Serialize)?);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(ParseError::Serialize)?;

    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Rebuild objects in key order; `serde_json::Map` keeps insertion order
/// when its `preserve_order` feature is enabled anywhere in the build.
fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
