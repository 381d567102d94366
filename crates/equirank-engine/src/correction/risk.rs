//! Stage G: hard risk filters
//!
//! Each filter is an independent check returning the gate name when it
//! fails. Any failure rejects the state with that reason; missing inputs
//! fail the affected check rather than waving it through.

use equirank_core::{CorrectionState, FundamentalAssessment, InstrumentProfile};

const MAX_DEBT_TO_EQUITY: f64 = 2.0;
const MIN_CURRENT_RATIO: f64 = 0.8;
const MIN_MARKET_CAP: f64 = 500.0;
const MIN_DAILY_VOLUME: f64 = 100_000.0;
const MAX_BETA: f64 = 1.5;
const MIN_LISTED_MONTHS: u32 = 6;

type RiskCheck = fn(&InstrumentProfile, Option<&FundamentalAssessment>, f64) -> Option<&'static str>;

const CHECKS: &[RiskCheck] = &[
    check_debt_to_equity,
    check_current_ratio,
    check_market_cap,
    check_daily_volume,
    check_beta,
    check_listed_age,
];

/// Run every risk filter; reject on the first failure
///
/// A missing profile is itself a conservative rejection: the filters
/// cannot vouch for an instrument they cannot see.
pub fn apply_risk_filters(
    profile: Option<&InstrumentProfile>,
    fundamental: Option<&FundamentalAssessment>,
    state: &mut CorrectionState,
) -> bool {
    let Some(profile) = profile else {
        state.reject("risk_filter:profile_unavailable");
        return false;
    };

    for check in CHECKS {
        if let Some(reason) = check(profile, fundamental, state.blended_confidence) {
            tracing::debug!(reason, "risk filter failed");
            state.reject(reason);
            return false;
        }
    }

    state.risk_passed = true;
    true
}

/// Leverage cap; unknown D/E (non-positive equity or missing
/// fundamentals) counts as failing
fn check_debt_to_equity(
    _profile: &InstrumentProfile,
    fundamental: Option<&FundamentalAssessment>,
    _confidence: f64,
) -> Option<&'static str> {
    match fundamental.and_then(|f| f.debt_to_equity) {
        Some(ratio) if ratio <= MAX_DEBT_TO_EQUITY => None,
        _ => Some("risk_filter:debt_to_equity"),
    }
}

fn check_current_ratio(
    profile: &InstrumentProfile,
    _fundamental: Option<&FundamentalAssessment>,
    _confidence: f64,
) -> Option<&'static str> {
    (profile.current_ratio < MIN_CURRENT_RATIO).then_some("risk_filter:current_ratio")
}

fn check_market_cap(
    profile: &InstrumentProfile,
    _fundamental: Option<&FundamentalAssessment>,
    _confidence: f64,
) -> Option<&'static str> {
    (profile.market_cap < MIN_MARKET_CAP).then_some("risk_filter:market_cap")
}

fn check_daily_volume(
    profile: &InstrumentProfile,
    _fundamental: Option<&FundamentalAssessment>,
    _confidence: f64,
) -> Option<&'static str> {
    (profile.avg_daily_volume < MIN_DAILY_VOLUME).then_some("risk_filter:daily_volume")
}

/// High beta passes only when the blended confidence backs it up
fn check_beta(
    profile: &InstrumentProfile,
    _fundamental: Option<&FundamentalAssessment>,
    confidence: f64,
) -> Option<&'static str> {
    (profile.beta > MAX_BETA && confidence <= 0.5).then_some("risk_filter:beta")
}

fn check_listed_age(
    profile: &InstrumentProfile,
    _fundamental: Option<&FundamentalAssessment>,
    _confidence: f64,
) -> Option<&'static str> {
    (profile.listed_months < MIN_LISTED_MONTHS).then_some("risk_filter:listed_age")
}

#[cfg(test)]
mod tests {
    use super::*;
    use equirank_core::HealthStatus;

    fn profile() -> InstrumentProfile {
        InstrumentProfile {
            market_cap: 10_000.0,
            beta: 1.1,
            avg_daily_volume: 500_000.0,
            current_ratio: 1.5,
            listed_months: 48,
            sector: "technology".to_string(),
        }
    }

    fn fundamental(debt_to_equity: Option<f64>) -> FundamentalAssessment {
        FundamentalAssessment {
            quarterly_growth_yoy: Some(10.0),
            annual_growth_yoy: Some(8.0),
            profit_margin: Some(12.0),
            debt_to_equity,
            is_profitable: true,
            net_worth_positive: true,
            health_status: HealthStatus::Healthy,
            confidence: 60.0,
        }
    }

    fn passing_state() -> CorrectionState {
        let mut state = CorrectionState::default();
        state.blended_confidence = 0.6;
        state
    }

    #[test]
    fn test_clean_profile_passes() {
        let mut state = passing_state();
        let fundamental = fundamental(Some(0.8));
        assert!(apply_risk_filters(
            Some(&profile()),
            Some(&fundamental),
            &mut state
        ));
        assert!(state.risk_passed);
        assert!(state.rejection_reason.is_none());
    }

    #[test]
    fn test_missing_profile_rejects() {
        let mut state = passing_state();
        assert!(!apply_risk_filters(None, Some(&fundamental(Some(0.8))), &mut state));
        assert_eq!(
            state.rejection_reason.as_deref(),
            Some("risk_filter:profile_unavailable")
        );
    }

    #[test]
    fn test_unknown_leverage_rejects() {
        let mut state = passing_state();
        let fundamental = fundamental(None);
        assert!(!apply_risk_filters(
            Some(&profile()),
            Some(&fundamental),
            &mut state
        ));
        assert_eq!(
            state.rejection_reason.as_deref(),
            Some("risk_filter:debt_to_equity")
        );
    }

    #[test]
    fn test_excess_leverage_rejects() {
        let mut state = passing_state();
        let fundamental = fundamental(Some(2.4));
        assert!(!apply_risk_filters(
            Some(&profile()),
            Some(&fundamental),
            &mut state
        ));
    }

    #[test]
    fn test_high_beta_passes_with_confidence() {
        let mut risky = profile();
        risky.beta = 1.8;

        let mut state = passing_state();
        let fundamental = fundamental(Some(0.8));
        assert!(apply_risk_filters(Some(&risky), Some(&fundamental), &mut state));

        let mut state = CorrectionState::default();
        state.blended_confidence = 0.4;
        assert!(!apply_risk_filters(Some(&risky), Some(&fundamental), &mut state));
        assert_eq!(state.rejection_reason.as_deref(), Some("risk_filter:beta"));
    }

    #[test]
    fn test_recent_listing_rejects() {
        let mut young = profile();
        young.listed_months = 3;
        let mut state = passing_state();
        let fundamental = fundamental(Some(0.8));
        assert!(!apply_risk_filters(Some(&young), Some(&fundamental), &mut state));
        assert_eq!(
            state.rejection_reason.as_deref(),
            Some("risk_filter:listed_age")
        );
    }
}
