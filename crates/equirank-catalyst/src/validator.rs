//! Grounding validator for external opinions
//!
//! Five independent checks, evaluated uniformly as a (name, predicate) list.
//! Any single violation rejects the whole opinion; rejection substitutes the
//! deterministic fallback in place and is never surfaced as an error. There
//! is no retry - one accept-or-substitute decision per opinion.

use crate::facts::{FactPackage, FactValue};
use crate::fallback::{FallbackScore, fallback_opinion};
use crate::opinion::CatalystOpinion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Injectable validation configuration
///
/// The forbidden-phrase list is data, not logic: deployments tune it without
/// touching the checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// External-knowledge phrases an opinion may not use unless the same
    /// datum was supplied in the fact package
    pub forbidden_phrases: Vec<String>,
    /// Absolute tolerance when matching cited numbers and reasoning tokens
    pub numeric_tolerance: f64,
    /// Maximum allowed |opinion.score - fallback.score|
    pub max_divergence: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            forbidden_phrases: [
                "as is widely known",
                "it is well known",
                "historically",
                "analysts expect",
                "consensus estimates",
                "all-time high",
                "in recent years",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            numeric_tolerance: 0.5,
            max_divergence: 15.0,
        }
    }
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub check: &'static str,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.detail)
    }
}

/// Result of validating one opinion
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Opinion passed every check and is used as-is
    Accepted(CatalystOpinion),
    /// Opinion rejected; a same-shape fallback opinion substitutes it
    Substituted {
        opinion: CatalystOpinion,
        violations: Vec<Violation>,
    },
}

struct CheckContext<'a> {
    facts: &'a FactPackage,
    fallback: &'a FallbackScore,
    policy: &'a ValidationPolicy,
}

type CheckFn = fn(&CatalystOpinion, &CheckContext<'_>) -> Option<String>;

/// The checks, evaluated independently and in order
const CHECKS: &[(&str, CheckFn)] = &[
    ("cited_facts_grounded", check_cited_facts),
    ("numeric_tokens_traceable", check_numeric_tokens),
    ("no_external_knowledge", check_forbidden_phrases),
    ("score_divergence", check_divergence),
    ("sentiment_consistent", check_sentiment),
];

/// Run every check and collect violations
pub fn validate(
    opinion: &CatalystOpinion,
    facts: &FactPackage,
    fallback: &FallbackScore,
    policy: &ValidationPolicy,
) -> Vec<Violation> {
    let ctx = CheckContext {
        facts,
        fallback,
        policy,
    };
    CHECKS
        .iter()
        .filter_map(|(name, check)| {
            check(opinion, &ctx).map(|detail| Violation {
                check: name,
                detail,
            })
        })
        .collect()
}

/// Validate an opinion, substituting the fallback when any check fails
pub fn validate_or_substitute(
    opinion: CatalystOpinion,
    facts: &FactPackage,
    fallback: &FallbackScore,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    let violations = validate(&opinion, facts, fallback, policy);
    if violations.is_empty() {
        ValidationOutcome::Accepted(opinion)
    } else {
        tracing::warn!(
            count = violations.len(),
            first = %violations[0],
            "rejecting external opinion, substituting fallback"
        );
        ValidationOutcome::Substituted {
            opinion: fallback_opinion(facts, fallback),
            violations,
        }
    }
}

/// Check 1: every cited fact must exist in the package with a matching value
fn check_cited_facts(opinion: &CatalystOpinion, ctx: &CheckContext<'_>) -> Option<String> {
    let mut offenders = Vec::new();
    for cited in &opinion.cited_facts {
        if ctx.facts.get(&cited.field).is_none() {
            offenders.push(format!("unknown field `{}`", cited.field));
        } else if !ctx
            .facts
            .matches(&cited.field, &cited.value, ctx.policy.numeric_tolerance)
        {
            offenders.push(format!("value mismatch for `{}`", cited.field));
        }
    }
    if offenders.is_empty() {
        None
    } else {
        Some(offenders.join("; "))
    }
}

fn numeric_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap_or_else(|_| unreachable!()))
}

/// Check 2: every numeric token in the reasoning must trace to a cited fact
fn check_numeric_tokens(opinion: &CatalystOpinion, ctx: &CheckContext<'_>) -> Option<String> {
    let cited_numbers: Vec<f64> = opinion
        .cited_facts
        .iter()
        .filter_map(|c| match &c.value {
            FactValue::Number(n) => Some(*n),
            _ => None,
        })
        .collect();

    let mut untraceable = Vec::new();
    for token in numeric_token_regex().find_iter(&opinion.reasoning) {
        let Ok(value) = token.as_str().parse::<f64>() else {
            continue;
        };
        let traceable = cited_numbers
            .iter()
            .any(|n| (n - value).abs() <= ctx.policy.numeric_tolerance);
        if !traceable {
            untraceable.push(token.as_str().to_string());
        }
    }
    if untraceable.is_empty() {
        None
    } else {
        Some(format!("untraceable numbers: {}", untraceable.join(", ")))
    }
}

/// Check 3: no external-knowledge phrases unless the datum was supplied
fn check_forbidden_phrases(opinion: &CatalystOpinion, ctx: &CheckContext<'_>) -> Option<String> {
    let reasoning = opinion.reasoning.to_lowercase();
    let hits: Vec<&str> = ctx
        .policy
        .forbidden_phrases
        .iter()
        .filter(|phrase| {
            reasoning.contains(&phrase.to_lowercase()) && !ctx.facts.contains_phrase(phrase)
        })
        .map(String::as_str)
        .collect();
    if hits.is_empty() {
        None
    } else {
        Some(format!("external-knowledge phrases: {}", hits.join(", ")))
    }
}

/// Check 4: the opinion may not stray too far from the deterministic score
fn check_divergence(opinion: &CatalystOpinion, ctx: &CheckContext<'_>) -> Option<String> {
    let divergence = (opinion.score - ctx.fallback.score).abs();
    if divergence > ctx.policy.max_divergence {
        Some(format!(
            "opinion score {:.1} vs deterministic {:.1} (|diff| {:.1} > {:.1})",
            opinion.score, ctx.fallback.score, divergence, ctx.policy.max_divergence
        ))
    } else {
        None
    }
}

/// Check 5: sentiment must agree with the deterministic read of the facts
fn check_sentiment(opinion: &CatalystOpinion, ctx: &CheckContext<'_>) -> Option<String> {
    if opinion.sentiment == ctx.fallback.sentiment {
        None
    } else {
        Some(format!(
            "opinion {:?} vs deterministic {:?}",
            opinion.sentiment, ctx.fallback.sentiment
        ))
    }
}
