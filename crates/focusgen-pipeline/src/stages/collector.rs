use crossbeam_channel::Receiver;
use focusgen_core::Record;
use tracing::info;

use crate::errors::PipelineError;
use crate::output::RecordSink;

/// Rows and batches the collector handed to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CollectorSummary {
    pub(crate) rows_written: u64,
    pub(crate) batches: u64,
}

/// Single consumer of the result queue and sole writer of the sink.
pub(crate) struct Collector<'a, K: RecordSink + ?Sized> {
    sink: &'a mut K,
    batch_size: usize,
    buffer: Vec<Record>,
    summary: CollectorSummary,
}

impl<'a, K: RecordSink + ?Sized> Collector<'a, K> {
    pub(crate) fn new(sink: &'a mut K, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            sink,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            summary: CollectorSummary::default(),
        }
    }

    /// Drain `results` until it is closed and empty, flushing every full
    /// batch, then flush whatever remains.
    pub(crate) fn run(
        mut self,
        results: Receiver<Record>,
    ) -> Result<CollectorSummary, PipelineError> {
        for record in results.iter() {
            self.buffer.push(record);
            if self.buffer.len() >= self.batch_size {
                self.flush()?;
                info!(
                    rows_written = self.summary.rows_written,
                    batch = self.summary.batches,
                    "batch flushed"
                );
            }
        }

        self.flush()?;
        info!(
            rows_written = self.summary.rows_written,
            batches = self.summary.batches,
            "final flush complete"
        );
        Ok(self.summary)
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.sink.write_batch(&self.buffer)?;
        self.sink.flush()?;
        if !self.buffer.is_empty() {
            self.summary.rows_written += self.buffer.len() as u64;
            self.summary.batches += 1;
        }
        self.buffer.clear();
        Ok(())
    }
}
