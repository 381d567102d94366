//! Score aggregation
//!
//! Blends per-observation sub-scores into a hybrid and per-observation
//! hybrids into the instrument score. Missing sub-scores renormalize the
//! blend over what is available; they never zero anything out.

use equirank_core::{
    FundamentalAssessment, ScoredObservation, TechnicalSnapshot, TrendDirection, clamp,
};

const MAX_FUNDAMENTAL_BONUS: f64 = 8.0;
const SOFT_CAP: f64 = 90.0;

/// Quantitative technical/momentum score, 0-100, neutral at 50
///
/// Mirrors the fallback scorer's technical read so the two stay
/// comparable: trend, momentum, mean-reversion RSI, and volume
/// confirmation, each a bounded bucket around the neutral midpoint.
pub fn technical_alpha(technical: &TechnicalSnapshot) -> f64 {
    let mut alpha = 50.0;

    match technical.trend_direction {
        TrendDirection::Up => alpha += 15.0,
        TrendDirection::Down => alpha -= 15.0,
        TrendDirection::Sideways => {}
    }

    if technical.momentum_5d >= 5.0 {
        alpha += 10.0;
    } else if technical.momentum_5d <= -5.0 {
        alpha -= 10.0;
    }

    if technical.rsi14 <= 30.0 {
        alpha += 15.0;
    } else if technical.rsi14 >= 70.0 {
        alpha -= 15.0;
    }

    if technical.volume_ratio >= 2.0 {
        alpha += 10.0;
    } else if technical.volume_ratio >= 1.3 {
        alpha += 5.0;
    }

    if technical.bollinger_position <= 0.2 {
        alpha += 5.0;
    } else if technical.bollinger_position >= 0.8 {
        alpha -= 5.0;
    }

    clamp(alpha, 0.0, 100.0)
}

/// Fundamentals bonus/penalty, bounded to +/-8 around confidence 50
pub fn fundamental_bonus(fundamental: Option<&FundamentalAssessment>) -> f64 {
    fundamental.map_or(0.0, |f| {
        clamp(
            (f.confidence - 50.0) / 50.0 * MAX_FUNDAMENTAL_BONUS,
            -MAX_FUNDAMENTAL_BONUS,
            MAX_FUNDAMENTAL_BONUS,
        )
    })
}

/// Per-observation hybrid score, 0-100
///
/// The catalyst weight is scaled by the observation's certainty; the
/// remainder goes to the technical alpha. With no technical snapshot the
/// blend renormalizes to the catalyst score alone.
pub fn observation_score(
    catalyst_score: f64,
    certainty: f64,
    alpha: Option<f64>,
    fundamental: Option<&FundamentalAssessment>,
    catalyst_weight: f64,
) -> f64 {
    let effective_weight = catalyst_weight * (certainty / 100.0);
    let blended = match alpha {
        Some(alpha) => effective_weight * catalyst_score + (1.0 - effective_weight) * alpha,
        None => catalyst_score,
    };
    clamp(blended + fundamental_bonus(fundamental), 0.0, 100.0)
}

/// More observations mean more trust, up to +15%
pub fn evidence_factor(count: usize) -> f64 {
    if count == 0 {
        return 1.0;
    }
    (1.0 + (count - 1) as f64 * 0.05).min(1.15)
}

/// Distinct catalyst drivers mean more trust, up to +10%
pub fn diversity_factor(unique_catalysts: usize) -> f64 {
    (1.0 + unique_catalysts as f64 * 0.02).min(1.10)
}

/// Compress the top of the scale; strictly monotonic in `raw`
pub fn soft_cap(raw: f64) -> f64 {
    if raw > SOFT_CAP {
        SOFT_CAP + (raw - SOFT_CAP) * 0.3
    } else {
        raw
    }
}

/// Certainty-weighted mean of observation scores
///
/// Falls back to the plain mean when every certainty is zero, and to 0.0
/// with no observations at all.
pub fn weighted_mean_score(observations: &[ScoredObservation]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let total_weight: f64 = observations.iter().map(|o| o.certainty).sum();
    if total_weight <= 0.0 {
        return observations.iter().map(|o| o.score).sum::<f64>() / observations.len() as f64;
    }
    observations
        .iter()
        .map(|o| o.score * o.certainty)
        .sum::<f64>()
        / total_weight
}

/// Per-instrument aggregate over scored observations, 0-100
pub fn instrument_score(observations: &[ScoredObservation]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let base = weighted_mean_score(observations);
    let unique_catalysts = observations
        .iter()
        .flat_map(|o| o.catalysts.iter())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let raw = base * evidence_factor(observations.len()) * diversity_factor(unique_catalysts);
    clamp(soft_cap(raw), 0.0, 100.0)
}
