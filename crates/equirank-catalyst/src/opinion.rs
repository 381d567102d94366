//! Catalyst opinion types
//!
//! The reasoning service returns loosely structured text; this module turns
//! it into a strongly-typed [`CatalystOpinion`] or an explicit
//! [`CatalystOutcome::Unparseable`] - never an ad hoc key lookup.

use crate::facts::FactValue;
use equirank_core::{Recommendation, Sentiment, clamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fact the opinion claims to be grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitedFact {
    pub field: String,
    pub value: FactValue,
}

/// Structured opinion from the reasoning service - untrusted until validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystOpinion {
    /// Catalyst score, 0-100
    pub score: f64,
    pub sentiment: Sentiment,
    /// Classified catalyst drivers (earnings, contract, investment, ...)
    pub catalysts: BTreeSet<String>,
    /// Risks the opinion flags
    pub risks: BTreeSet<String>,
    /// Self-reported certainty, 0-100
    pub certainty: f64,
    pub recommendation: Recommendation,
    /// Facts the opinion cites; every numeric claim in `reasoning` must
    /// trace back to one of these
    pub cited_facts: Vec<CitedFact>,
    /// Free-text reasoning
    #[serde(default)]
    pub reasoning: String,
}

impl CatalystOpinion {
    /// Parse a raw provider response into a typed outcome
    ///
    /// Out-of-range score/certainty values are clamped rather than rejected;
    /// structural failures become `Unparseable` with the raw payload kept
    /// for the reason trail.
    pub fn parse(raw: &str) -> CatalystOutcome {
        match serde_json::from_str::<CatalystOpinion>(raw) {
            Ok(mut opinion) => {
                opinion.score = clamp(opinion.score, 0.0, 100.0);
                opinion.certainty = clamp(opinion.certainty, 0.0, 100.0);
                CatalystOutcome::Opinion(opinion)
            }
            Err(err) => {
                tracing::warn!(%err, "unparseable catalyst response");
                CatalystOutcome::Unparseable(raw.to_string())
            }
        }
    }
}

/// Tagged provider outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalystOutcome {
    /// A structurally valid opinion (still unvalidated)
    Opinion(CatalystOpinion),
    /// Response received but not parseable into an opinion
    Unparseable(String),
    /// Provider explicitly signalled it cannot assess right now
    Unavailable,
}
