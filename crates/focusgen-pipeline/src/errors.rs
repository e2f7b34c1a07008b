use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the enrichment pipeline. All of them abort the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open source {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read source: {0}")]
    SourceRead(#[source] csv::Error),
    #[error("failed to create sink {path}: {source}")]
    SinkOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write sink: {0}")]
    SinkWrite(#[source] csv::Error),
    #[error("config error: {0}")]
    Config(#[from] focusgen_core::Error),
    #[error("template layout: {0}")]
    Layout(String),
    #[error("pipeline stage panicked: {0}")]
    StagePanicked(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Name of the stage that failed, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::SourceOpen { .. } | PipelineError::SourceRead(_) => "source",
            PipelineError::SinkOpen { .. } | PipelineError::SinkWrite(_) => "sink",
            PipelineError::Config(_) => "config",
            PipelineError::Layout(_) => "transform",
            PipelineError::StagePanicked(_) => "worker pool",
            PipelineError::Io(_) => "io",
        }
    }
}
