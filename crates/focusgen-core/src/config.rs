use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Providers enriched when the configuration does not name any.
pub const DEFAULT_PROVIDERS: &[&str] = &["AWS", "Google Cloud", "Oracle", "Microsoft"];

const DEFAULT_ROWS_PER_PROVIDER: u64 = 300_000;
const DEFAULT_WORKERS: usize = 16;
const DEFAULT_BATCH_SIZE: usize = 5_000;

/// Immutable parameters for one enrichment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Template CSV read by the dispatcher.
    pub input: PathBuf,
    /// CSV written by the collector.
    pub output: PathBuf,
    /// First month boundary (inclusive).
    pub start_date: NaiveDate,
    /// Upper date bound (exclusive).
    pub end_date: NaiveDate,
    #[serde(default = "default_rows_per_provider")]
    pub rows_per_provider: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Rows flushed to the sink per write.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Work queue capacity; defaults to the worker count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_queue_capacity: Option<usize>,
    /// Result queue capacity; defaults to the batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_queue_capacity: Option<usize>,
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    /// Seed for the per-worker generators. Random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl PipelineConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            start_date,
            end_date,
            rows_per_provider: DEFAULT_ROWS_PER_PROVIDER,
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            work_queue_capacity: None,
            result_queue_capacity: None,
            providers: default_providers(),
            seed: None,
        }
    }

    pub fn work_queue_capacity(&self) -> usize {
        self.work_queue_capacity.unwrap_or(self.workers)
    }

    pub fn result_queue_capacity(&self) -> usize {
        self.result_queue_capacity.unwrap_or(self.batch_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_string()));
        }
        if self.work_queue_capacity() == 0 {
            return Err(Error::InvalidConfig(
                "work_queue_capacity must be > 0".to_string(),
            ));
        }
        if self.result_queue_capacity() == 0 {
            return Err(Error::InvalidConfig(
                "result_queue_capacity must be > 0".to_string(),
            ));
        }
        if self.providers.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one provider is required".to_string(),
            ));
        }
        if self.providers.iter().any(|provider| provider.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "provider names must not be blank".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(Error::InvalidConfig(format!(
                "start_date {} must be before end_date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

fn default_rows_per_provider() -> u64 {
    DEFAULT_ROWS_PER_PROVIDER
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_providers() -> Vec<String> {
    DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PipelineConfig {
        PipelineConfig::new(
            "focus.csv",
            "mock.csv",
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        )
    }

    #[test]
    fn defaults_follow_worker_and_batch_sizes() {
        let config = base();
        assert!(config.validate().is_ok());
        assert_eq!(config.work_queue_capacity(), 16);
        assert_eq!(config.result_queue_capacity(), 5_000);
        assert_eq!(config.providers.len(), 4);
    }

    #[test]
    fn rejects_zero_sizes() {
        let mut config = base();
        config.workers = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = base();
        config.batch_size = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = base();
        config.result_queue_capacity = Some(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = base();
        config.work_queue_capacity = Some(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_range_and_empty_providers() {
        let mut config = base();
        config.end_date = config.start_date;
        assert!(config.validate().is_err());

        let mut config = base();
        config.providers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
input = "focus.csv"
output = "mock.csv"
start_date = "2024-07-01"
end_date = "2024-12-31"
workers = 4
providers = ["AWS"]
"#,
        )
        .expect("parse config");

        assert_eq!(config.workers, 4);
        assert_eq!(config.batch_size, 5_000);
        assert_eq!(config.rows_per_provider, 300_000);
        assert_eq!(config.work_queue_capacity(), 4);
        assert_eq!(config.providers, vec!["AWS".to_string()]);
        assert_eq!(config.seed, None);
    }
}
