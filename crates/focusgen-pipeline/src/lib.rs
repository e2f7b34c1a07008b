//! Bounded-parallelism enrichment pipeline for focusgen.
//!
//! A dispatcher feeds template rows into a bounded work queue, a fixed pool
//! of workers enriches them per (month, provider) schedule, and a single
//! collector flushes results to the sink in batches. Generated files can be
//! checked with [`validate`] and sampled down with [`reduce`].

pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod reduce;
pub mod source;
mod stages;
pub mod transform;
pub mod validate;

pub use engine::Pipeline;
pub use errors::PipelineError;
pub use model::{RunReport, WorkerExit, WorkerReport};
pub use output::{RecordSink, csv::CsvRecordSink};
pub use reduce::{ReduceOptions, ReduceReport, reduce_csv};
pub use source::{RecordSource, csv::CsvRecordSource};
pub use transform::{Transform, focus::{FocusColumn, FocusLayout, FocusTransform}};
pub use validate::{ValidateOptions, ValidationReport, validate_output};
