// Regional time-series aggregation for a daily per-country case feed.
//
// The feed is folded country -> continent -> world, each region gets a
// trimmed daily series with a trailing rolling average, and countries are
// ranked by total deaths.
pub mod calendar;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod loader;
pub mod output;
pub mod ranking;
pub mod region;
pub mod reports;
pub mod series;
pub mod types;
pub mod util;

pub use coordinator::{BatchState, Coordinator, Snapshot};
pub use error::{FeedError, Result};
pub use types::{RegionId, SeriesTable, Variable};
