//! Stage I: emergency safeguards
//!
//! Independent hard veto on boosting. Any critical condition makes the
//! boost unsafe regardless of how confident the earlier stages were.

use equirank_core::{EmergencyLevel, MarketContext};

const INDEX_CRASH_PCT: f64 = -5.0;
const SECTOR_SLUMP_PCT: f64 = -10.0;
const EARNINGS_SHOCK_PCT: f64 = -20.0;

/// Outcome of the emergency scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyAssessment {
    pub level: EmergencyLevel,
    /// Conditions that fired, for the reason trail
    pub triggers: Vec<String>,
}

impl EmergencyAssessment {
    /// Boosting is vetoed at critical severity
    pub fn safe_to_boost(&self) -> bool {
        self.level < EmergencyLevel::Critical
    }
}

/// Scan the market context for emergency conditions
///
/// The severity is the worst condition found. Missing context data simply
/// contributes nothing; the scan never fails.
pub fn assess_emergency(market: &MarketContext) -> EmergencyAssessment {
    let mut level = EmergencyLevel::None;
    let mut triggers = Vec::new();

    if let Some(daily) = market.index.as_ref().and_then(|s| s.pct_change(1)) {
        if daily < INDEX_CRASH_PCT {
            level = level.max(EmergencyLevel::Critical);
            triggers.push(format!("index_crash:{daily:.1}%"));
        }
    }

    if let Some(weekly) = market.sector.as_ref().and_then(|s| s.pct_change(5)) {
        if weekly < SECTOR_SLUMP_PCT {
            level = level.max(EmergencyLevel::Warning);
            triggers.push(format!("sector_slump:{weekly:.1}%"));
        }
    }

    if let Some(surprise) = market.earnings_surprise_pct {
        if surprise < EARNINGS_SHOCK_PCT {
            level = level.max(EmergencyLevel::Critical);
            triggers.push(format!("earnings_shock:{surprise:.1}%"));
        }
    }

    for hit in &market.scandal_hits {
        level = level.max(EmergencyLevel::Critical);
        triggers.push(format!("scandal:{hit}"));
    }

    if level > EmergencyLevel::None {
        tracing::warn!(?level, ?triggers, "emergency condition active");
    }
    EmergencyAssessment { level, triggers }
}
