use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use focusgen_core::{Error as CoreError, PipelineConfig};

use crate::CliError;

/// Pipeline settings that may come from flags instead of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Template CSV to enrich.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Destination CSV.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// First billing month (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,
    /// End of the date range (YYYY-MM-DD, exclusive).
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub rows_per_provider: Option<u64>,
    /// Number of worker threads.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Rows written per batch.
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Work queue capacity.
    #[arg(long = "work-queue", value_name = "CAPACITY")]
    pub work_queue_capacity: Option<usize>,
    /// Result queue capacity.
    #[arg(long = "result-queue", value_name = "CAPACITY")]
    pub result_queue_capacity: Option<usize>,
    /// Provider name (repeatable); replaces the configured list.
    #[arg(long = "provider", value_name = "NAME")]
    pub providers: Vec<String>,
    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Build the pipeline configuration from an optional TOML file plus flags.
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<PipelineConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<PipelineConfig>(&content)?
        }
        None => PipelineConfig::new(
            required(overrides.input.clone(), "--input")?,
            required(overrides.output.clone(), "--output")?,
            required(overrides.start, "--start")?,
            required(overrides.end, "--end")?,
        ),
    };
    apply_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, overrides: ConfigOverrides) {
    let ConfigOverrides {
        input,
        output,
        start,
        end,
        rows_per_provider,
        workers,
        batch_size,
        work_queue_capacity,
        result_queue_capacity,
        providers,
        seed,
    } = overrides;

    if let Some(input) = input {
        config.input = input;
    }
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(start) = start {
        config.start_date = start;
    }
    if let Some(end) = end {
        config.end_date = end;
    }
    if let Some(rows) = rows_per_provider {
        config.rows_per_provider = rows;
    }
    if let Some(workers) = workers {
        config.workers = workers;
    }
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    if work_queue_capacity.is_some() {
        config.work_queue_capacity = work_queue_capacity;
    }
    if result_queue_capacity.is_some() {
        config.result_queue_capacity = result_queue_capacity;
    }
    if !providers.is_empty() {
        config.providers = providers;
    }
    if seed.is_some() {
        config.seed = seed;
    }
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T, CliError> {
    value.ok_or_else(|| {
        CliError::Config(CoreError::InvalidConfig(format!(
            "{flag} is required without --config"
        )))
    })
}
