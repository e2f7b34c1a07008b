pub mod csv;

use focusgen_core::{Header, Record};

use crate::errors::PipelineError;

/// Sequential writer of output batches. Only the collector writes to it.
pub trait RecordSink: Send {
    fn write_header(&mut self, header: &Header) -> Result<(), PipelineError>;

    fn write_batch(&mut self, batch: &[Record]) -> Result<(), PipelineError>;

    fn flush(&mut self) -> Result<(), PipelineError>;

    /// Bytes handed to the underlying stream, when the sink tracks them.
    fn bytes_written(&self) -> Option<u64> {
        None
    }
}
