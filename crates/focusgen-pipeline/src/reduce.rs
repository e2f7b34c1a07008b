//! Down-sampling of a large CSV toward a target file size.

use std::path::Path;

use focusgen_core::{Error as CoreError, Record};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::PipelineError;
use crate::output::RecordSink;
use crate::output::csv::CsvRecordSink;
use crate::source::RecordSource;
use crate::source::csv::CsvRecordSource;

const REDUCE_BATCH: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReduceOptions {
    /// Approximate size of the reduced file.
    pub target_bytes: u64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReduceReport {
    pub seed: u64,
    pub input_bytes: u64,
    pub target_bytes: u64,
    /// Probability with which each row was kept.
    pub fraction: f64,
    pub rows_read: u64,
    pub rows_kept: u64,
    pub bytes_written: Option<u64>,
}

/// Keep a random subset of `input`'s rows so that `output` lands near
/// `target_bytes`. Rows keep their relative order and are copied verbatim.
pub fn reduce_csv(
    input: &Path,
    output: &Path,
    options: &ReduceOptions,
) -> Result<ReduceReport, PipelineError> {
    check_target(options)?;
    let input_bytes = std::fs::metadata(input)
        .map_err(|source| PipelineError::SourceOpen {
            path: input.to_path_buf(),
            source,
        })?
        .len();
    let mut source = CsvRecordSource::open(input)?;
    let mut sink = CsvRecordSink::create(output)?;
    reduce_source(&mut source, &mut sink, input_bytes, options)
}

/// Sample `source` into `sink`, keeping each row with probability
/// `target_bytes / input_bytes` (capped at 1).
pub fn reduce_source<S, K>(
    source: &mut S,
    sink: &mut K,
    input_bytes: u64,
    options: &ReduceOptions,
) -> Result<ReduceReport, PipelineError>
where
    S: RecordSource + ?Sized,
    K: RecordSink + ?Sized,
{
    check_target(options)?;
    let fraction = keep_fraction(input_bytes, options.target_bytes);
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    sink.write_header(source.header())?;

    let mut rows_read = 0u64;
    let mut rows_kept = 0u64;
    let mut batch: Vec<Record> = Vec::with_capacity(REDUCE_BATCH);
    while let Some(record) = source.next_record()? {
        rows_read += 1;
        if fraction < 1.0 && !rng.random_bool(fraction) {
            continue;
        }
        batch.push(record);
        if batch.len() >= REDUCE_BATCH {
            rows_kept += batch.len() as u64;
            sink.write_batch(&batch)?;
            batch.clear();
        }
    }
    rows_kept += batch.len() as u64;
    sink.write_batch(&batch)?;
    sink.flush()?;

    let report = ReduceReport {
        seed,
        input_bytes,
        target_bytes: options.target_bytes,
        fraction,
        rows_read,
        rows_kept,
        bytes_written: sink.bytes_written(),
    };
    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        fraction = report.fraction,
        "reduce completed"
    );
    Ok(report)
}

fn check_target(options: &ReduceOptions) -> Result<(), PipelineError> {
    if options.target_bytes == 0 {
        return Err(CoreError::InvalidConfig("target size must be > 0".to_string()).into());
    }
    Ok(())
}

fn keep_fraction(input_bytes: u64, target_bytes: u64) -> f64 {
    if input_bytes <= target_bytes {
        1.0
    } else {
        target_bytes as f64 / input_bytes as f64
    }
}
