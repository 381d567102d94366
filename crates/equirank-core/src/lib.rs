//! Core data model for the equirank scoring pipeline
//!
//! This crate defines the shared vocabulary of the workspace:
//!
//! - Price history ([`Candle`], [`PriceSeries`]) and financial statements
//!   ([`StatementSnapshot`])
//! - Computed signal snapshots ([`TechnicalSnapshot`],
//!   [`FundamentalAssessment`])
//! - The correction-boost state machine value ([`CorrectionState`])
//! - Scoring outputs ([`ScoredObservation`], [`RankedObservation`])
//! - The workspace error taxonomy ([`Error`])
//!
//! Everything here is plain data: no I/O, no async, no provider coupling.
//! The engines in `equirank-signals` and `equirank-engine` consume and
//! produce these types.

pub mod correction;
pub mod error;
pub mod observation;
pub mod score;
pub mod series;
pub mod types;

// Re-export main types for convenience
pub use correction::{CorrectionPhase, CorrectionState, EmergencyLevel};
pub use error::{Error, Result};
pub use observation::{Provenance, RankedObservation, ScoredObservation};
pub use score::{clamp, clamp01};
pub use series::{Candle, PriceSeries};
pub use types::{
    FundamentalAssessment, HealthStatus, InstrumentProfile, MarketContext, Recommendation,
    Sentiment, StatementCadence, StatementSnapshot, TechnicalSnapshot, TrendDirection,
};
