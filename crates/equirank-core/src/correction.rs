//! Correction-boost state machine value
//!
//! [`CorrectionState`] is created at detection, mutated forward-only within a
//! single analysis run, and discarded afterwards. Phase transitions go
//! through [`CorrectionState::advance`], which never regresses.

use serde::{Deserialize, Serialize};

/// Phase of the correction-boost pipeline
///
/// Variant order matters: later variants are "further along", and the two
/// terminal outcomes sort last so `advance` can never back out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionPhase {
    None,
    Detected,
    ReversalConfirmed,
    BoostApplied,
    Rejected,
}

/// Market-wide emergency severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyLevel {
    None,
    Warning,
    Critical,
}

/// Accumulated output of the correction-boost stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionState {
    pub phase: CorrectionPhase,
    /// Pullback from the 90-bar high, percent
    pub correction_pct: f64,
    /// Consecutive prior-day declines ending at the latest bar
    pub decline_days: usize,
    /// Latest volume over the 30-bar mean
    pub volume_ratio: f64,
    /// Detection confirmation: decline streak plus volume spike
    pub confirmed: bool,
    /// Which reversal signals fired (consolidation, above-sma20, ...)
    pub reversal_signals: Vec<String>,
    /// Composite oversold measure, 0-100
    pub oversold_score: f64,
    /// Fundamental confidence, 0-100
    pub fundamental_confidence: f64,
    /// Catalyst strength, 0-100
    pub catalyst_strength: f64,
    /// Blended confidence, 0-1
    pub blended_confidence: f64,
    pub risk_passed: bool,
    pub emergency_level: EmergencyLevel,
    pub boost_points: f64,
    /// Gate that stopped the pipeline, when any did
    pub rejection_reason: Option<String>,
}

impl Default for CorrectionState {
    fn default() -> Self {
        Self {
            phase: CorrectionPhase::None,
            correction_pct: 0.0,
            decline_days: 0,
            volume_ratio: 0.0,
            confirmed: false,
            reversal_signals: Vec::new(),
            oversold_score: 0.0,
            fundamental_confidence: 0.0,
            catalyst_strength: 0.0,
            blended_confidence: 0.0,
            risk_passed: false,
            emergency_level: EmergencyLevel::None,
            boost_points: 0.0,
            rejection_reason: None,
        }
    }
}

impl CorrectionState {
    /// Advance the phase, ignoring any attempt to move backwards
    pub fn advance(&mut self, next: CorrectionPhase) {
        if next > self.phase {
            self.phase = next;
        } else if next < self.phase {
            tracing::debug!(current = ?self.phase, attempted = ?next, "ignoring phase regression");
        }
    }

    /// Mark the state rejected with a gate-specific reason
    ///
    /// The first recorded reason wins; later rejections never overwrite it.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.advance(CorrectionPhase::Rejected);
        if self.rejection_reason.is_none() {
            self.rejection_reason = Some(reason.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_never_regresses() {
        let mut state = CorrectionState::default();
        state.advance(CorrectionPhase::ReversalConfirmed);
        state.advance(CorrectionPhase::Detected);
        assert_eq!(state.phase, CorrectionPhase::ReversalConfirmed);
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut state = CorrectionState::default();
        state.reject("risk_filter:debt_to_equity");
        state.advance(CorrectionPhase::BoostApplied);
        assert_eq!(state.phase, CorrectionPhase::Rejected);
        assert_eq!(
            state.rejection_reason.as_deref(),
            Some("risk_filter:debt_to_equity")
        );
    }

    #[test]
    fn test_first_rejection_reason_wins() {
        let mut state = CorrectionState::default();
        state.reject("reversal_not_confirmed");
        state.reject("risk_filter:beta");
        assert_eq!(
            state.rejection_reason.as_deref(),
            Some("reversal_not_confirmed")
        );
    }
}
