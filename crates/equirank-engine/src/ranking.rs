//! Ranking and the read-only sanity pass
//!
//! [`rank`] orders instruments by hybrid score and runs a diagnostic pass
//! over the result. Flags never mutate scores; they exist so a human can
//! see where the ranking looks overconfident, unsupported, or internally
//! inconsistent.

use equirank_core::{
    CorrectionPhase, HealthStatus, Provenance, RankedObservation, Sentiment, TrendDirection,
};
use serde::Serialize;
use std::fmt;

const SPARSE_CERTAINTY: f64 = 60.0;
const SPARSE_COMPLETENESS: f64 = 0.5;
const DIVERGENCE_CATALYST_TOLERANCE: f64 = 2.0;
const DIVERGENCE_SCORE_GAP: f64 = 15.0;
const HIGH_SCORE: f64 = 85.0;
const LOW_SCORE: f64 = 25.0;
const INVERSION_TOLERANCE: f64 = 5.0;

/// One finding of the sanity pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum RankingFlag {
    /// High average certainty on thin evidence
    OverconfidentSparseData {
        instrument_id: String,
        certainty: f64,
        completeness: f64,
    },
    /// Near-identical catalyst input, far-apart final scores
    CatalystScoreDivergence {
        first: String,
        second: String,
        divergence: f64,
    },
    /// A top score without enough strong signals behind it
    UnsupportedHighScore {
        instrument_id: String,
        score: f64,
        strong_signals: usize,
    },
    /// A bottom score without any clear negative signal
    UnexplainedLowScore { instrument_id: String, score: f64 },
    /// A lower-ranked instrument whose fallback score beats a
    /// higher-ranked one's by more than the tolerance
    RankInversion {
        higher: String,
        lower: String,
        gap: f64,
    },
}

impl fmt::Display for RankingFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverconfidentSparseData {
                instrument_id,
                certainty,
                completeness,
            } => write!(
                f,
                "{instrument_id}: certainty {certainty:.0} on completeness {completeness:.2}"
            ),
            Self::CatalystScoreDivergence {
                first,
                second,
                divergence,
            } => write!(
                f,
                "{first} vs {second}: similar catalysts, scores {divergence:.1} apart"
            ),
            Self::UnsupportedHighScore {
                instrument_id,
                score,
                strong_signals,
            } => write!(
                f,
                "{instrument_id}: score {score:.1} backed by {strong_signals} strong signal(s)"
            ),
            Self::UnexplainedLowScore {
                instrument_id,
                score,
            } => write!(f, "{instrument_id}: score {score:.1} with no negative signal"),
            Self::RankInversion { higher, lower, gap } => write!(
                f,
                "{lower} ranked below {higher} despite fallback lead of {gap:.1}"
            ),
        }
    }
}

/// Diagnostic report attached to a ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingReport {
    pub flags: Vec<RankingFlag>,
}

impl RankingReport {
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for RankingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.is_empty() {
            return write!(f, "ranking sanity pass: clean");
        }
        writeln!(f, "ranking sanity pass: {} flag(s)", self.flags.len())?;
        for flag in &self.flags {
            writeln!(f, "  - {flag}")?;
        }
        Ok(())
    }
}

/// Order instruments by hybrid score and run the sanity pass
///
/// Ties break on instrument id so the ordering is deterministic. Scores
/// are never mutated.
pub fn rank(mut observations: Vec<RankedObservation>) -> (Vec<RankedObservation>, RankingReport) {
    observations.sort_by(|a, b| {
        b.hybrid_score
            .total_cmp(&a.hybrid_score)
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });

    let mut report = RankingReport::default();
    for ranked in &observations {
        check_overconfidence(ranked, &mut report);
        check_score_support(ranked, &mut report);
    }
    check_divergence(&observations, &mut report);
    check_inversions(&observations, &mut report);

    if !report.is_clean() {
        tracing::warn!(flags = report.flags.len(), "ranking sanity pass raised flags");
    }
    (observations, report)
}

fn check_overconfidence(ranked: &RankedObservation, report: &mut RankingReport) {
    let certainty = ranked.avg_certainty();
    let completeness = ranked.data_completeness();
    if certainty > SPARSE_CERTAINTY && completeness < SPARSE_COMPLETENESS {
        report.flags.push(RankingFlag::OverconfidentSparseData {
            instrument_id: ranked.instrument_id.clone(),
            certainty,
            completeness,
        });
    }
}

/// Signals strong enough to justify a top score
fn strong_signals(ranked: &RankedObservation) -> usize {
    let mut count = 0;
    if ranked
        .observations
        .iter()
        .any(|o| o.provenance == Provenance::Validated && o.certainty >= 70.0)
    {
        count += 1;
    }
    if ranked.fundamental.as_ref().is_some_and(|f| f.confidence >= 60.0) {
        count += 1;
    }
    if ranked
        .correction
        .as_ref()
        .is_some_and(|c| c.phase == CorrectionPhase::BoostApplied)
    {
        count += 1;
    }
    if ranked.technical.as_ref().is_some_and(|t| {
        t.trend_direction == TrendDirection::Up || t.momentum_5d >= 5.0
    }) {
        count += 1;
    }
    count
}

/// Signals clearly pointing down
fn has_negative_signal(ranked: &RankedObservation) -> bool {
    ranked
        .observations
        .iter()
        .any(|o| o.sentiment == Sentiment::Bearish)
        || ranked
            .fundamental
            .as_ref()
            .is_some_and(|f| f.health_status == HealthStatus::Distressed)
        || ranked
            .technical
            .as_ref()
            .is_some_and(|t| t.trend_direction == TrendDirection::Down)
        || ranked
            .correction
            .as_ref()
            .is_some_and(|c| c.phase == CorrectionPhase::Rejected)
}

fn check_score_support(ranked: &RankedObservation, report: &mut RankingReport) {
    if ranked.hybrid_score > HIGH_SCORE {
        let strong = strong_signals(ranked);
        if strong < 2 {
            report.flags.push(RankingFlag::UnsupportedHighScore {
                instrument_id: ranked.instrument_id.clone(),
                score: ranked.hybrid_score,
                strong_signals: strong,
            });
        }
    } else if ranked.hybrid_score < LOW_SCORE
        && !ranked.observations.is_empty()
        && !has_negative_signal(ranked)
    {
        report.flags.push(RankingFlag::UnexplainedLowScore {
            instrument_id: ranked.instrument_id.clone(),
            score: ranked.hybrid_score,
        });
    }
}

fn check_divergence(observations: &[RankedObservation], report: &mut RankingReport) {
    for (i, first) in observations.iter().enumerate() {
        for second in &observations[i + 1..] {
            let catalyst_gap = (first.avg_catalyst_score() - second.avg_catalyst_score()).abs();
            let score_gap = (first.hybrid_score - second.hybrid_score).abs();
            if catalyst_gap <= DIVERGENCE_CATALYST_TOLERANCE && score_gap > DIVERGENCE_SCORE_GAP {
                report.flags.push(RankingFlag::CatalystScoreDivergence {
                    first: first.instrument_id.clone(),
                    second: second.instrument_id.clone(),
                    divergence: score_gap,
                });
            }
        }
    }
}

fn check_inversions(observations: &[RankedObservation], report: &mut RankingReport) {
    for (i, higher) in observations.iter().enumerate() {
        for lower in &observations[i + 1..] {
            let gap = lower.avg_fallback_score() - higher.avg_fallback_score();
            if gap > INVERSION_TOLERANCE {
                report.flags.push(RankingFlag::RankInversion {
                    higher: higher.instrument_id.clone(),
                    lower: lower.instrument_id.clone(),
                    gap,
                });
            }
        }
    }
}
