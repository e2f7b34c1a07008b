pub mod csv;

use focusgen_core::{Header, Record};

use crate::errors::PipelineError;

/// Sequential reader of template records.
pub trait RecordSource: Send {
    /// Header row read when the source was opened.
    fn header(&self) -> &Header;

    /// Next template record, `None` once the stream is exhausted.
    fn next_record(&mut self) -> Result<Option<Record>, PipelineError>;
}
