use thiserror::Error;

/// Core error type shared across focusgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The pipeline configuration violates an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results returned by focusgen crates.
pub type Result<T> = std::result::Result<T, Error>;
