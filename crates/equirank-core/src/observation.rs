//! Scoring output types
//!
//! A [`ScoredObservation`] is one catalyst observation after validation and
//! blending; a [`RankedObservation`] is the per-instrument aggregate that
//! enters the final ranking. Both carry a human-readable reason trail so a
//! score is always explainable after the fact.

use crate::correction::CorrectionState;
use crate::types::{FundamentalAssessment, Sentiment, TechnicalSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where an observation's catalyst score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// External opinion passed every grounding check
    Validated,
    /// External opinion rejected or unavailable; deterministic score used
    Fallback,
}

/// One catalyst observation after scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredObservation {
    /// Per-observation hybrid score, 0-100
    pub score: f64,
    /// Catalyst score that entered the blend (validated or fallback), 0-100
    pub catalyst_score: f64,
    /// Certainty of the catalyst score used, 0-100
    pub certainty: f64,
    pub provenance: Provenance,
    pub sentiment: Sentiment,
    /// Classified catalyst drivers cited by this observation
    pub catalysts: BTreeSet<String>,
    /// Deterministic fallback score computed for the same facts; kept even
    /// when the external opinion was accepted, for cross-instrument checks
    pub fallback_score: f64,
    /// Reason trail (validation outcome, missing data, ...)
    pub notes: Vec<String>,
}

/// Per-instrument scoring result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedObservation {
    pub instrument_id: String,
    /// Final hybrid score, 0-100
    pub hybrid_score: f64,
    /// Number of observations that contributed
    pub evidence_count: usize,
    pub observations: Vec<ScoredObservation>,
    pub technical: Option<TechnicalSnapshot>,
    pub fundamental: Option<FundamentalAssessment>,
    pub correction: Option<CorrectionState>,
    /// Instrument-level reason trail
    pub notes: Vec<String>,
}

impl RankedObservation {
    /// Fraction of the three evidence groups (technical, fundamental,
    /// observations) that are present, 0-1
    pub fn data_completeness(&self) -> f64 {
        let mut present = 0usize;
        if self.technical.is_some() {
            present += 1;
        }
        if self.fundamental.is_some() {
            present += 1;
        }
        if !self.observations.is_empty() {
            present += 1;
        }
        present as f64 / 3.0
    }

    /// Mean certainty across observations, 0 when there are none
    pub fn avg_certainty(&self) -> f64 {
        if self.observations.is_empty() {
            return 0.0;
        }
        self.observations.iter().map(|o| o.certainty).sum::<f64>()
            / self.observations.len() as f64
    }

    /// Mean catalyst score that entered the blends
    pub fn avg_catalyst_score(&self) -> f64 {
        if self.observations.is_empty() {
            return 0.0;
        }
        self.observations
            .iter()
            .map(|o| o.catalyst_score)
            .sum::<f64>()
            / self.observations.len() as f64
    }

    /// Mean deterministic fallback score across observations
    pub fn avg_fallback_score(&self) -> f64 {
        if self.observations.is_empty() {
            return 0.0;
        }
        self.observations
            .iter()
            .map(|o| o.fallback_score)
            .sum::<f64>()
            / self.observations.len() as f64
    }

    /// Union of catalysts across observations
    pub fn catalysts(&self) -> BTreeSet<String> {
        self.observations
            .iter()
            .flat_map(|o| o.catalysts.iter().cloned())
            .collect()
    }
}
