pub mod focus;
pub mod values;

use focusgen_core::{EnrichmentContext, Header, Record};
use rand::RngCore;

use crate::errors::PipelineError;

/// Maps a template record and its enrichment context to an output record.
///
/// Implementations hold no shared mutable state; all randomness comes from
/// the generator handed in by the worker, so a seeded generator makes the
/// output reproducible.
pub trait Transform: Send + Sync {
    fn apply(&self, template: Record, ctx: &EnrichmentContext, rng: &mut dyn RngCore) -> Record;

    /// Reject a source whose header cannot carry this transform's output.
    fn check_header(&self, _header: &Header) -> Result<(), PipelineError> {
        Ok(())
    }
}

impl<F> Transform for F
where
    F: Fn(Record, &EnrichmentContext, &mut dyn RngCore) -> Record + Send + Sync,
{
    fn apply(&self, template: Record, ctx: &EnrichmentContext, rng: &mut dyn RngCore) -> Record {
        self(template, ctx, rng)
    }
}
