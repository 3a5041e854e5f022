//! FLO chart client library for PMOMusic
//!
//! This crate fetches the realtime chart of the FLO streaming service
//! (music-flo.com) and turns it into an ordered list of [`ChartEntry`].
//!
//! # Features
//!
//! - **Chart fetch**: one blocking request to the FLO display API, sent with
//!   the headers of the mobile app
//! - **Strict parsing**: every track is validated, a malformed payload fails
//!   the whole parse instead of producing a partial chart
//! - **Cover resizing**: image URLs are rewritten to the requested size
//! - **Chart date**: the chart rolls over at 22:00 local time
//! - **JSON output**: sorted, pretty-printed, non-ASCII kept as is
//!
//! # Example
//!
//! ```no_run
//! use pmoflo::{FloChart, FloClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut chart = FloChart::new(FloClient::new(), 512);
//!     chart.fetch_entries()?;
//!
//!     println!("{} ({:?})", chart.name().unwrap_or_default(), chart.date());
//!     for entry in chart.iter().take(10) {
//!         println!("{:>3}. {} - {}", entry.rank, entry.artist, entry.title);
//!     }
//!
//!     println!("{}", chart.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The library is silent by default. Enable the `logging` feature to get
//! `tracing` events for requests and failed updates.

pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;

// Re-exports
pub use chart::{ChartState, FloChart};
pub use client::{ClientBuilder, FloClient};
pub use config::FloConfig;
pub use error::{Error, ParseError, RequestError, Result};
pub use models::{ChartEntry, ChartSnapshot};
pub use parser::{chart_date, chart_date_at, parse, parse_at, resize_image_url};
