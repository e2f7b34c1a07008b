mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use config::{ConfigOverrides, load_config};
use focusgen_core::Error as CoreError;
use focusgen_pipeline::{
    Pipeline, PipelineError, ReduceOptions, ValidateOptions, reduce_csv, validate_output,
};
use logging::init_logging;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{} stage failed: {0}", .0.stage())]
    Pipeline(#[from] PipelineError),
    #[error("{0}")]
    Config(#[from] CoreError),
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("validation failed: {0} check(s) did not pass")]
    ValidationFailed(usize),
}

#[derive(Parser, Debug)]
#[command(name = "focusgen", version, about = "FOCUS billing mock data generator")]
struct Cli {
    /// Default log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Append JSON logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich a template CSV into a mock billing dataset.
    Generate(GenerateArgs),
    /// Check a generated CSV for expected columns, dates and providers.
    Validate(ValidateArgs),
    /// Randomly sample a CSV down toward a target file size.
    Reduce(ReduceArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// TOML file with pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: ConfigOverrides,
    /// Write the run report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Generated CSV to check.
    file: PathBuf,
    /// Rows to sample at random from the whole file.
    #[arg(long, default_value_t = 2000)]
    sample: usize,
    /// Seed for a reproducible sample.
    #[arg(long)]
    seed: Option<u64>,
    /// Start of the generation window (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", requires = "end")]
    start: Option<NaiveDate>,
    /// End of the generation window (YYYY-MM-DD, exclusive).
    #[arg(long, value_name = "DATE", requires = "start")]
    end: Option<NaiveDate>,
    /// Provider expected in the file (repeatable).
    #[arg(long = "provider", value_name = "NAME")]
    providers: Vec<String>,
}

#[derive(Args, Debug)]
struct ReduceArgs {
    /// CSV to sample from.
    input: PathBuf,
    /// Destination for the reduced CSV.
    output: PathBuf,
    /// Approximate size of the reduced file in bytes.
    #[arg(long, value_name = "BYTES")]
    target_bytes: u64,
    /// Seed for a reproducible sample.
    #[arg(long)]
    seed: Option<u64>,
    /// Write the reduce report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("focusgen: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(cli.log_file.as_deref(), &cli.log_level)?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Reduce(args) => run_reduce(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config,
        overrides,
        report,
    } = args;

    let config = load_config(config.as_deref(), overrides)?;
    tracing::info!(
        event = "config_loaded",
        input = %config.input.display(),
        output = %config.output.display(),
        start = %config.start_date,
        end = %config.end_date
    );

    let pipeline = Pipeline::new(config)?;
    let run_report = pipeline.run_csv()?;

    if let Some(path) = report {
        std::fs::write(&path, serde_json::to_vec_pretty(&run_report)?)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    println!(
        "Generated {} rows of mock data and saved to {}",
        run_report.rows_written,
        pipeline.config().output.display()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let mut options = ValidateOptions {
        sample_size: args.sample,
        seed: args.seed,
        window: args.start.zip(args.end),
        ..ValidateOptions::default()
    };
    if !args.providers.is_empty() {
        options.providers = args.providers;
    }

    let report = validate_output(&args.file, &options)?;
    println!(
        "Validated {} ({} of {} rows sampled)",
        args.file.display(),
        report.rows_sampled,
        report.rows_scanned
    );
    for check in &report.checks {
        let status = if check.passed { "ok" } else { "FAILED" };
        match &check.detail {
            Some(detail) => println!("  {:<24} {status}: {detail}", check.name),
            None => println!("  {:<24} {status}", check.name),
        }
    }

    let failures = report.failures().count();
    if failures > 0 {
        return Err(CliError::ValidationFailed(failures));
    }
    Ok(())
}

fn run_reduce(args: ReduceArgs) -> Result<(), CliError> {
    let options = ReduceOptions {
        target_bytes: args.target_bytes,
        seed: args.seed,
    };
    let report = reduce_csv(&args.input, &args.output, &options)?;

    if let Some(path) = args.report {
        std::fs::write(&path, serde_json::to_vec_pretty(&report)?)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    println!(
        "Kept {} of {} rows ({:.4} fraction) and saved to {}",
        report.rows_kept,
        report.rows_read,
        report.fraction,
        args.output.display()
    );
    Ok(())
}
