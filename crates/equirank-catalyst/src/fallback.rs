//! Deterministic fallback scorer
//!
//! A pure function of the structured facts - no model, no randomness, no
//! state. Used whenever the external opinion is rejected or the provider is
//! unreachable, and always computed anyway as the grounding reference for
//! the validator's divergence and sentiment checks.

use crate::facts::FactPackage;
use crate::opinion::{CatalystOpinion, CitedFact};
use equirank_core::{Recommendation, Sentiment, clamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fields whose presence drives the certainty fraction
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &[
    "catalyst_type",
    "earnings_growth_pct",
    "rsi14",
    "trend",
    "momentum_5d",
    "volume_ratio",
];

/// Deterministic score derived from structured facts only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackScore {
    /// Final score, 0-100
    pub score: f64,
    pub sentiment: Sentiment,
    /// Fraction of required fields present, as 0-100
    pub certainty: f64,
    /// News-rule component, [-40, 40]
    pub news_component: f64,
    /// Technical-rule component, [-40, 40]
    pub technical_component: f64,
    /// Volume-anomaly component, [-20, 20]
    pub volume_component: f64,
}

/// Score a fact package deterministically
///
/// `required_fields` drives the certainty fraction; pass
/// [`DEFAULT_REQUIRED_FIELDS`] unless the caller has configured its own set.
pub fn score_from_facts(facts: &FactPackage, required_fields: &[&str]) -> FallbackScore {
    let news_component = clamp(news_rules(facts), -40.0, 40.0);
    let technical_component = clamp(technical_rules(facts), -40.0, 40.0);
    let volume_component = clamp(volume_rules(facts), -20.0, 20.0);

    let score = clamp(
        50.0 + 0.4 * news_component + 0.4 * technical_component + 0.2 * volume_component,
        0.0,
        100.0,
    );

    let sentiment = if score > 60.0 {
        Sentiment::Bullish
    } else if score < 40.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    };

    let present = required_fields
        .iter()
        .filter(|f| facts.get(f).is_some())
        .count();
    let certainty = if required_fields.is_empty() {
        0.0
    } else {
        present as f64 / required_fields.len() as f64 * 100.0
    };

    FallbackScore {
        score,
        sentiment,
        certainty,
        news_component,
        technical_component,
        volume_component,
    }
}

/// Earnings-growth, dividend-yield, and deal-size rules
fn news_rules(facts: &FactPackage) -> f64 {
    let mut component = 0.0;

    if let Some(growth) = facts.number("earnings_growth_pct") {
        component += if growth >= 25.0 {
            30.0
        } else if growth >= 10.0 {
            18.0
        } else if growth >= 0.0 {
            8.0
        } else if growth >= -10.0 {
            -10.0
        } else {
            -25.0
        };
    }

    if let Some(yield_pct) = facts.number("dividend_yield_pct") {
        if yield_pct >= 5.0 {
            component += 12.0;
        } else if yield_pct >= 2.0 {
            component += 6.0;
        }
    }

    if let (Some(deal), Some(cap)) = (facts.number("deal_value"), facts.number("market_cap")) {
        if cap > 0.0 {
            let ratio = deal / cap;
            if ratio >= 0.10 {
                component += 20.0;
            } else if ratio >= 0.03 {
                component += 10.0;
            }
        }
    }

    component
}

/// RSI, trend-vs-MA, and momentum rules
fn technical_rules(facts: &FactPackage) -> f64 {
    let mut component = 0.0;

    if let Some(rsi) = facts.number("rsi14") {
        if rsi <= 30.0 {
            component += 15.0;
        } else if rsi >= 70.0 {
            component -= 15.0;
        }
    }

    match facts.text("trend") {
        Some("up") => component += 15.0,
        Some("down") => component -= 15.0,
        _ => {}
    }

    if let Some(momentum) = facts.number("momentum_5d") {
        if momentum >= 5.0 {
            component += 10.0;
        } else if momentum <= -5.0 {
            component -= 10.0;
        }
    }

    component
}

/// Volume anomaly rules
fn volume_rules(facts: &FactPackage) -> f64 {
    let Some(ratio) = facts.number("volume_ratio") else {
        return 0.0;
    };
    let momentum = facts.number("momentum_5d").unwrap_or(0.0);

    // Heavy volume into a decline reads as distribution, not accumulation
    if momentum < 0.0 && ratio >= 1.5 {
        return -12.0;
    }
    if ratio >= 2.0 {
        15.0
    } else if ratio >= 1.3 {
        8.0
    } else {
        0.0
    }
}

/// Build a same-shape opinion from a fallback score
///
/// Used to substitute a rejected or missing external opinion in place; the
/// caller tags the provenance as fallback.
pub fn fallback_opinion(facts: &FactPackage, score: &FallbackScore) -> CatalystOpinion {
    let mut catalysts = BTreeSet::new();
    if let Some(kind) = facts.text("catalyst_type") {
        catalysts.insert(kind.to_string());
    }

    let recommendation = match score.sentiment {
        Sentiment::Bullish => Recommendation::Buy,
        Sentiment::Bearish => Recommendation::Sell,
        Sentiment::Neutral => Recommendation::Hold,
    };

    let cited_facts = facts
        .fields()
        .map(|(field, value)| CitedFact {
            field: field.clone(),
            value: value.clone(),
        })
        .collect();

    CatalystOpinion {
        score: score.score,
        sentiment: score.sentiment,
        catalysts,
        risks: BTreeSet::new(),
        certainty: score.certainty,
        recommendation,
        cited_facts,
        reasoning: "deterministic score from structured facts".to_string(),
    }
}
