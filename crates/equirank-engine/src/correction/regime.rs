//! Stage H: market-regime adjustment
//!
//! Classifies the broad market from the index proxy and adjusts the boost
//! gate accordingly: bull markets lower the confidence bar and amplify the
//! boost, bear markets do the opposite. A missing proxy degrades the
//! adjustment to neutral, it never rejects anything.

use equirank_core::{MarketContext, PriceSeries};

const MA_LOOKBACK: usize = 50;
const SECTOR_MA_LOOKBACK: usize = 20;
const BULL_THRESHOLD_PCT: f64 = 5.0;
const HIGH_VOLATILITY: f64 = 30.0;

/// Broad market classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketRegime {
    Bull,
    Bear,
    Uncertain,
}

/// Regime-derived boost gate parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeParams {
    pub regime: MarketRegime,
    /// Minimum blended confidence required to boost
    pub confidence_threshold: f64,
    /// Multiplier applied to the boost tier
    pub boost_multiplier: f64,
    /// Sector-relative nudge applied to the blended confidence
    pub confidence_nudge: f64,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            regime: MarketRegime::Uncertain,
            confidence_threshold: 0.30,
            boost_multiplier: 1.0,
            confidence_nudge: 1.0,
        }
    }
}

/// Classify the market regime and derive the boost gate parameters
pub fn classify_regime(market: &MarketContext) -> RegimeParams {
    let mut params = match market.index.as_ref().and_then(distance_from_ma_50) {
        Some(distance) if distance > BULL_THRESHOLD_PCT => RegimeParams {
            regime: MarketRegime::Bull,
            confidence_threshold: 0.25,
            boost_multiplier: 1.1,
            confidence_nudge: 1.0,
        },
        Some(distance) if distance < -BULL_THRESHOLD_PCT => RegimeParams {
            regime: MarketRegime::Bear,
            confidence_threshold: 0.35,
            boost_multiplier: 0.8,
            confidence_nudge: 1.0,
        },
        _ => RegimeParams::default(),
    };

    if let Some(proxy) = market.volatility_proxy {
        if proxy > HIGH_VOLATILITY {
            params.confidence_threshold += 0.05;
            params.boost_multiplier *= 0.8;
        }
    }

    if let Some(distance) = market.sector.as_ref().and_then(distance_from_ma_20) {
        if distance > BULL_THRESHOLD_PCT {
            params.confidence_nudge = 1.08;
        } else if distance < -BULL_THRESHOLD_PCT {
            params.confidence_nudge = 0.90;
        }
    }

    tracing::debug!(
        regime = ?params.regime,
        threshold = params.confidence_threshold,
        multiplier = params.boost_multiplier,
        "market regime classified"
    );
    params
}

fn distance_from_ma_50(series: &PriceSeries) -> Option<f64> {
    distance_from_ma(series, MA_LOOKBACK)
}

fn distance_from_ma_20(series: &PriceSeries) -> Option<f64> {
    distance_from_ma(series, SECTOR_MA_LOOKBACK)
}

/// Latest close vs the n-bar moving average, percent
fn distance_from_ma(series: &PriceSeries, window: usize) -> Option<f64> {
    let latest = series.latest()?.close;
    let tail = series.tail(window);
    if tail.is_empty() {
        return None;
    }
    let ma = tail.iter().map(|b| b.close).sum::<f64>() / tail.len() as f64;
    if ma <= 0.0 {
        return None;
    }
    Some((latest - ma) / ma * 100.0)
}
