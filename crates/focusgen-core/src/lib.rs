//! Shared vocabulary for focusgen crates.
//!
//! Records, the month schedule workers walk, and the immutable pipeline
//! configuration live here so the pipeline and CLI crates agree on them.

pub mod config;
pub mod error;
pub mod record;
pub mod schedule;

pub use config::{DEFAULT_PROVIDERS, PipelineConfig};
pub use error::{Error, Result};
pub use record::{Header, Record};
pub use schedule::{EnrichmentContext, PERIOD_FORMAT, Schedule, month_boundaries};
