//! Correction-boost pipeline
//!
//! A staged, hard-gated state machine deciding whether a recent pullback is
//! a genuine buyable dip or noise. Stages are pure functions threading a
//! [`CorrectionState`]; every gate either passes control to the next stage
//! or stops the run with a recorded reason:
//!
//! 1. [`stages::detect_correction`] - pullback depth inside the buyable band
//! 2. [`stages::confirm_reversal`] - at least 2-of-4 reversal signals
//! 3. [`stages::measure_oversold`] / fundamentals / catalyst strength / blend
//! 4. [`risk::apply_risk_filters`] - hard balance-sheet and liquidity gates
//! 5. [`regime::classify_regime`] - bull/bear gate parameters
//! 6. [`safeguards::assess_emergency`] - unconditional veto on critical
//! 7. [`apply_boost`] - tiered boost, applied last
//!
//! A gate failure is an outcome (`phase = Rejected` plus a reason), never
//! an error.

pub mod regime;
pub mod risk;
pub mod safeguards;
pub mod stages;

pub use regime::{MarketRegime, RegimeParams, classify_regime};
pub use safeguards::{EmergencyAssessment, assess_emergency};

use equirank_core::{
    CorrectionPhase, CorrectionState, FundamentalAssessment, InstrumentProfile, MarketContext,
    PriceSeries, TechnicalSnapshot, clamp01,
};

/// Everything the correction-boost pipeline reads
///
/// All references: the pipeline owns nothing and mutates nothing but the
/// state it returns.
pub struct CorrectionInputs<'a> {
    pub series: &'a PriceSeries,
    pub technical: &'a TechnicalSnapshot,
    pub fundamental: Option<&'a FundamentalAssessment>,
    /// Strongest accepted catalyst observation as (score, certainty),
    /// both 0-100; `None` when no observation survived
    pub catalyst: Option<(f64, f64)>,
    pub profile: Option<&'a InstrumentProfile>,
    pub market: &'a MarketContext,
    /// Pre-boost instrument hybrid score, used by the boost cap
    pub base_hybrid: f64,
}

/// Run the full correction-boost pipeline
///
/// Always returns a state; the phase and rejection reason say how far it
/// got. An undetected or unconfirmed pullback is not a rejection, the
/// state simply stops short of the later stages.
pub fn run_pipeline(inputs: &CorrectionInputs<'_>) -> CorrectionState {
    let mut state = CorrectionState::default();

    if !stages::detect_correction(inputs.series, &mut state) {
        return state;
    }
    state.advance(CorrectionPhase::Detected);
    if !state.confirmed {
        tracing::debug!(
            decline_days = state.decline_days,
            volume_ratio = state.volume_ratio,
            "correction detected but unconfirmed"
        );
        return state;
    }

    if !stages::confirm_reversal(inputs.series, inputs.technical, &mut state) {
        return state;
    }
    state.advance(CorrectionPhase::ReversalConfirmed);

    stages::measure_oversold(inputs.technical, &mut state);
    stages::fundamental_confidence(inputs.fundamental, &mut state);
    stages::catalyst_strength(inputs.catalyst, &mut state);
    stages::blend_confidence(&mut state);

    if !risk::apply_risk_filters(inputs.profile, inputs.fundamental, &mut state) {
        return state;
    }

    let params = classify_regime(inputs.market);
    state.blended_confidence = clamp01(state.blended_confidence * params.confidence_nudge);

    let emergency = assess_emergency(inputs.market);
    state.emergency_level = emergency.level;

    apply_boost(&params, &emergency, inputs.base_hybrid, &mut state);
    state
}

/// Stage J: grant the tiered boost, or reject
///
/// The emergency veto is checked before confidence on purpose: a critical
/// market condition overrides any confidence level.
pub fn apply_boost(
    params: &RegimeParams,
    emergency: &EmergencyAssessment,
    base_hybrid: f64,
    state: &mut CorrectionState,
) {
    if !emergency.safe_to_boost() {
        state.reject("emergency_veto");
        return;
    }
    if state.blended_confidence < params.confidence_threshold {
        state.reject("confidence_below_threshold");
        return;
    }

    let tier = if state.blended_confidence >= 0.85 {
        20.0
    } else if state.blended_confidence >= 0.70 {
        15.0
    } else if state.blended_confidence >= 0.55 {
        10.0
    } else if state.blended_confidence >= 0.40 {
        5.0
    } else {
        0.0
    };
    if tier == 0.0 {
        state.reject("boost_tier_zero");
        return;
    }

    let mut boost = tier * params.boost_multiplier;
    // Already-strong scores get at most a token boost
    if base_hybrid >= 85.0 {
        boost = boost.min(5.0);
    }

    state.boost_points = boost;
    state.advance(CorrectionPhase::BoostApplied);
    tracing::info!(
        boost,
        confidence = state.blended_confidence,
        "correction boost applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use equirank_core::EmergencyLevel;

    fn calm() -> EmergencyAssessment {
        EmergencyAssessment {
            level: EmergencyLevel::None,
            triggers: Vec::new(),
        }
    }

    fn confident_state(confidence: f64) -> CorrectionState {
        let mut state = CorrectionState::default();
        state.advance(CorrectionPhase::ReversalConfirmed);
        state.blended_confidence = confidence;
        state.risk_passed = true;
        state
    }

    #[test]
    fn test_boost_tiers() {
        for (confidence, expected) in [(0.9, 20.0), (0.75, 15.0), (0.6, 10.0), (0.45, 5.0)] {
            let mut state = confident_state(confidence);
            apply_boost(&RegimeParams::default(), &calm(), 60.0, &mut state);
            assert_eq!(state.phase, CorrectionPhase::BoostApplied);
            assert!((state.boost_points - expected).abs() < 1e-9, "at {confidence}");
        }
    }

    #[test]
    fn test_sub_tier_confidence_rejected() {
        // Above the uncertain-regime threshold but below the lowest tier
        let mut state = confident_state(0.35);
        apply_boost(&RegimeParams::default(), &calm(), 60.0, &mut state);
        assert_eq!(state.phase, CorrectionPhase::Rejected);
        assert_eq!(state.rejection_reason.as_deref(), Some("boost_tier_zero"));
    }

    #[test]
    fn test_emergency_veto_overrides_confidence() {
        let mut state = confident_state(0.95);
        let emergency = EmergencyAssessment {
            level: EmergencyLevel::Critical,
            triggers: vec!["index_crash:-6.0%".to_string()],
        };
        apply_boost(&RegimeParams::default(), &emergency, 60.0, &mut state);
        assert_eq!(state.phase, CorrectionPhase::Rejected);
        assert_eq!(state.rejection_reason.as_deref(), Some("emergency_veto"));
        assert_eq!(state.boost_points, 0.0);
    }

    #[test]
    fn test_high_base_caps_boost() {
        let mut state = confident_state(0.9);
        apply_boost(&RegimeParams::default(), &calm(), 88.0, &mut state);
        assert_eq!(state.boost_points, 5.0);
    }

    #[test]
    fn test_bear_multiplier_shrinks_boost() {
        let mut state = confident_state(0.75);
        let params = RegimeParams {
            regime: MarketRegime::Bear,
            confidence_threshold: 0.35,
            boost_multiplier: 0.8,
            confidence_nudge: 1.0,
        };
        apply_boost(&params, &calm(), 60.0, &mut state);
        assert!((state.boost_points - 12.0).abs() < 1e-9);
    }
}
