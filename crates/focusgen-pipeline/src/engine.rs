use std::any::Any;
use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;
use focusgen_core::{PipelineConfig, Record, Schedule};
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::model::{RunReport, WorkerReport};
use crate::output::RecordSink;
use crate::output::csv::CsvRecordSink;
use crate::source::RecordSource;
use crate::source::csv::CsvRecordSource;
use crate::stages::{Collector, Worker, dispatch};
use crate::transform::Transform;
use crate::transform::focus::{FocusLayout, FocusTransform};

/// Orchestrates dispatcher, worker pool and collector for one run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Enrich the configured input CSV into the configured output CSV with
    /// the FOCUS transform.
    pub fn run_csv(&self) -> Result<RunReport, PipelineError> {
        let mut source = CsvRecordSource::open(&self.config.input)?;
        let layout = FocusLayout::from_header(source.header())?;
        let transform = FocusTransform::new(layout, self.config.providers.clone());
        let mut sink = CsvRecordSink::create(&self.config.output)?;
        self.run(&mut source, &mut sink, &transform)
    }

    /// Run the pipeline to completion.
    ///
    /// The collector starts first, then the workers, then the dispatcher.
    /// The result queue is closed only after every worker has been joined,
    /// and this call returns only after the collector's final flush.
    pub fn run<S, K, T>(
        &self,
        source: &mut S,
        sink: &mut K,
        transform: &T,
    ) -> Result<RunReport, PipelineError>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
        T: Transform + ?Sized,
    {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        let schedule = Schedule::new(config);
        let workers = config.workers;

        if config.rows_per_provider % workers as u64 != 0 {
            warn!(
                rows_per_provider = config.rows_per_provider,
                workers,
                rows_per_worker = schedule.rows_per_worker(),
                "rows_per_provider is not a multiple of workers; demand rounds down"
            );
        }

        info!(
            run_id = %run_id,
            workers,
            batch_size = config.batch_size,
            months = schedule.months().len(),
            providers = schedule.providers().len(),
            demand = schedule.demand(),
            seed,
            "pipeline started"
        );

        transform.check_header(source.header())?;
        sink.write_header(source.header())?;

        let outcome = thread::scope(|scope| -> Result<StageOutcome, PipelineError> {
            let (jobs_tx, jobs_rx) = bounded::<Record>(config.work_queue_capacity());
            let (results_tx, results_rx) = bounded::<Record>(config.result_queue_capacity());

            let collector = Collector::new(sink, config.batch_size);
            let collector_handle = thread::Builder::new()
                .name("focusgen-collector".to_string())
                .spawn_scoped(scope, move || collector.run(results_rx))?;

            let mut worker_handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let worker = Worker::new(id, &schedule, transform, worker_seed(seed, id));
                let jobs = jobs_rx.clone();
                let results = results_tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("focusgen-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run(jobs, results))?;
                worker_handles.push(handle);
            }
            // Workers hold the only receivers, so the dispatcher sees the
            // queue disconnect once they have all left.
            drop(jobs_rx);

            let dispatcher_handle = thread::Builder::new()
                .name("focusgen-dispatcher".to_string())
                .spawn_scoped(scope, move || dispatch(source, jobs_tx))?;

            let mut worker_reports = Vec::with_capacity(workers);
            let mut panics = Vec::new();
            for handle in worker_handles {
                match handle.join() {
                    Ok(report) => worker_reports.push(report),
                    Err(panic) => panics.push(panic_message(panic)),
                }
            }

            // Every worker has stopped pushing; close the result queue.
            drop(results_tx);

            let collected = collector_handle
                .join()
                .map_err(|panic| PipelineError::StagePanicked(panic_message(panic)))?;
            let dispatched = dispatcher_handle
                .join()
                .map_err(|panic| PipelineError::StagePanicked(panic_message(panic)))?;

            let records_read = dispatched?;
            if let Some(message) = panics.into_iter().next() {
                return Err(PipelineError::StagePanicked(message));
            }
            let collected = collected?;

            Ok(StageOutcome {
                records_read,
                rows_written: collected.rows_written,
                batches: collected.batches,
                worker_reports,
            })
        });

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(run_id = %run_id, stage = err.stage(), error = %err, "pipeline failed");
                return Err(err);
            }
        };

        let report = RunReport {
            run_id,
            seed,
            workers,
            batch_size: config.batch_size,
            months: schedule.months().len(),
            providers: schedule.providers().to_vec(),
            demand: schedule.demand(),
            records_read: outcome.records_read,
            rows_written: outcome.rows_written,
            batches: outcome.batches,
            bytes_written: sink.bytes_written(),
            duration_ms: start.elapsed().as_millis() as u64,
            worker_reports: outcome.worker_reports,
        };

        info!(
            run_id = %report.run_id,
            records_read = report.records_read,
            rows_written = report.rows_written,
            batches = report.batches,
            duration_ms = report.duration_ms,
            "pipeline completed"
        );
        Ok(report)
    }
}

struct StageOutcome {
    records_read: u64,
    rows_written: u64,
    batches: u64,
    worker_reports: Vec<WorkerReport>,
}

fn worker_seed(seed: u64, worker: usize) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in worker.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_seeds_differ_per_worker() {
        let seeds: std::collections::HashSet<u64> = (0..16).map(|id| worker_seed(42, id)).collect();
        assert_eq!(seeds.len(), 16);
        assert_eq!(worker_seed(42, 3), worker_seed(42, 3));
        assert_ne!(worker_seed(42, 3), worker_seed(43, 3));
    }
}
