//! Catalyst assessment boundary
//!
//! Everything that touches the external reasoning service lives here, and
//! nothing from that service is trusted until it survives validation:
//!
//! - [`FactPackage`] - the structured facts handed to the service; the only
//!   data an opinion may cite
//! - [`CatalystAssessmentProvider`] - async provider trait with an explicit
//!   unavailable signal
//! - [`instruction_for`] - the constrained-instruction template
//! - [`validate_or_substitute`] - the multi-layer grounding validator
//! - [`score_from_facts`] - the deterministic fallback scorer used whenever
//!   an opinion is rejected or the provider is unreachable
//!
//! The contract: callers always end up with a same-shape opinion, tagged
//! with its provenance. Rejection is a substitution, never an error.

pub mod facts;
pub mod fallback;
pub mod opinion;
pub mod prompt;
pub mod provider;
pub mod validator;

pub use facts::{FactPackage, FactValue};
pub use fallback::{DEFAULT_REQUIRED_FIELDS, FallbackScore, fallback_opinion, score_from_facts};
pub use opinion::{CatalystOpinion, CatalystOutcome, CitedFact};
pub use prompt::instruction_for;
pub use provider::CatalystAssessmentProvider;
pub use validator::{ValidationOutcome, ValidationPolicy, Violation, validate_or_substitute};
