//! Catalyst assessment provider trait

use crate::facts::FactPackage;
use crate::opinion::CatalystOutcome;
use async_trait::async_trait;
use equirank_core::Result;

/// Trait for catalyst assessment providers
///
/// Implementations wrap an external reasoning service. They must return
/// [`CatalystOutcome::Unavailable`] (or an error the caller treats the same
/// way) when the service cannot answer - the scoring pipeline degrades to
/// the deterministic fallback, it never waits indefinitely. Callers enforce
/// their own deadline on top of this call.
#[async_trait]
pub trait CatalystAssessmentProvider: Send + Sync {
    /// Assess the catalyst described by the fact package
    ///
    /// `instruction` is the rendered constrained-instruction template; the
    /// provider must pass it through unmodified so grounding rules reach
    /// the service verbatim.
    async fn assess(
        &self,
        instrument_id: &str,
        facts: &FactPackage,
        instruction: &str,
    ) -> Result<CatalystOutcome>;

    /// Provider name for logs and provenance ("anthropic", "local", ...)
    fn name(&self) -> &str;
}
