//! Detection, reversal, oversold, and confidence stages

use equirank_core::{
    CorrectionState, FundamentalAssessment, PriceSeries, TechnicalSnapshot, clamp01,
};
use equirank_signals::{bullish_reversal_pattern, rsi_last_two};

const HIGH_LOOKBACK: usize = 90;
const DETECT_VOLUME_WINDOW: usize = 30;
const VOLUME_SPIKE_RATIO: f64 = 1.3;
const MIN_CORRECTION_PCT: f64 = 10.0;
const MAX_CORRECTION_PCT: f64 = 35.0;
const MIN_DECLINE_DAYS: usize = 5;

/// Stage A: detect a buyable-range pullback
///
/// Emits `correction_pct`, `decline_days`, and `volume_ratio` regardless of
/// the outcome. Returns whether the pullback depth is inside [10, 35]
/// percent; outside that range the pipeline stops with the phase still
/// `None`. This is a hard gate, not a penalty.
pub fn detect_correction(series: &PriceSeries, state: &mut CorrectionState) -> bool {
    let Some(latest) = series.latest() else {
        return false;
    };

    let recent_high = series
        .tail(HIGH_LOOKBACK)
        .iter()
        .map(|b| b.close)
        .fold(f64::MIN, f64::max);
    if recent_high <= 0.0 {
        return false;
    }

    state.correction_pct = (recent_high - latest.close) / recent_high * 100.0;
    state.decline_days = consecutive_declines(series);
    state.volume_ratio = detection_volume_ratio(series);

    let volume_spike = state.volume_ratio > VOLUME_SPIKE_RATIO;
    state.confirmed = state.decline_days >= MIN_DECLINE_DAYS && volume_spike;

    (MIN_CORRECTION_PCT..=MAX_CORRECTION_PCT).contains(&state.correction_pct)
}

/// Consecutive prior-day close declines ending at the latest bar
fn consecutive_declines(series: &PriceSeries) -> usize {
    let bars = series.bars();
    let mut count = 0;
    for pair in bars.windows(2).rev() {
        if pair[1].close < pair[0].close {
            count += 1;
        } else {
            break;
        }
    }
    count
}

/// Latest volume over the 30-bar mean; zero-mean guard yields 1.0
fn detection_volume_ratio(series: &PriceSeries) -> f64 {
    let volumes = series.volumes();
    let Some(&latest) = volumes.last() else {
        return 1.0;
    };
    let window = &volumes[volumes.len().saturating_sub(DETECT_VOLUME_WINDOW)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    if mean <= 0.0 { 1.0 } else { latest / mean }
}

/// Stage B: confirm the pullback has stopped worsening
///
/// Four independent signals; at least two must fire:
/// consolidation (10-day close range under 10% of the close), close above
/// SMA20, RSI above 50 (or freshly crossed above it), and a recognized
/// bullish candlestick pattern. Fewer than two rejects the state.
pub fn confirm_reversal(
    series: &PriceSeries,
    technical: &TechnicalSnapshot,
    state: &mut CorrectionState,
) -> bool {
    let Some(latest) = series.latest() else {
        state.reject("reversal_not_confirmed");
        return false;
    };
    let close = latest.close;

    let tail = series.tail(10);
    let high = tail.iter().map(|b| b.close).fold(f64::MIN, f64::max);
    let low = tail.iter().map(|b| b.close).fold(f64::MAX, f64::min);
    if close > 0.0 && (high - low) / close * 100.0 < 10.0 {
        state.reversal_signals.push("consolidation".to_string());
    }

    if close > technical.sma20 {
        state.reversal_signals.push("above_sma20".to_string());
    }

    if let Some((prev_rsi, rsi)) = rsi_last_two(series) {
        if rsi > 50.0 {
            if prev_rsi <= 50.0 {
                state.reversal_signals.push("rsi_crossed_50".to_string());
            } else {
                state.reversal_signals.push("rsi_above_50".to_string());
            }
        }
    }

    if let Some(pattern) = bullish_reversal_pattern(series) {
        state.reversal_signals.push(pattern.to_string());
    }

    if state.reversal_signals.len() >= 2 {
        true
    } else {
        state.reject("reversal_not_confirmed");
        false
    }
}

/// Stage C: composite oversold measure
///
/// RSI, Bollinger position, and volume-anomaly buckets, capped at 100.
pub fn measure_oversold(technical: &TechnicalSnapshot, state: &mut CorrectionState) {
    let rsi_bucket: f64 = if technical.rsi14 <= 25.0 {
        30.0
    } else if technical.rsi14 <= 35.0 {
        20.0
    } else if technical.rsi14 <= 45.0 {
        10.0
    } else {
        0.0
    };

    let bollinger_bucket = if technical.bollinger_position <= 0.15 {
        25.0
    } else if technical.bollinger_position <= 0.35 {
        15.0
    } else if technical.bollinger_position <= 0.50 {
        5.0
    } else {
        0.0
    };

    let volume_bucket = if state.volume_ratio > 1.5 {
        15.0
    } else if state.volume_ratio > 1.2 {
        8.0
    } else {
        0.0
    };

    state.oversold_score = (rsi_bucket + bollinger_bucket + volume_bucket).min(100.0);
}

/// Stage E: catalyst strength from the strongest accepted observation
///
/// No observation means strength zero: a pure technical reversal with no
/// catalyst support is never boosted.
pub fn catalyst_strength(catalyst: Option<(f64, f64)>, state: &mut CorrectionState) {
    let Some((score, certainty)) = catalyst else {
        state.catalyst_strength = 0.0;
        return;
    };

    let score_bucket: f64 = if score >= 80.0 {
        25.0
    } else if score >= 70.0 {
        18.0
    } else if score >= 60.0 {
        12.0
    } else {
        0.0
    };

    let certainty_bonus = if certainty / 100.0 >= 0.8 {
        10.0
    } else if certainty / 100.0 >= 0.6 {
        5.0
    } else {
        0.0
    };

    state.catalyst_strength = (score_bucket + certainty_bonus).min(100.0);
}

/// Stage F: blend oversold, fundamental, and catalyst into one confidence
///
/// Catalyst carries the highest weight.
pub fn blend_confidence(state: &mut CorrectionState) {
    state.blended_confidence = clamp01(
        (0.3 * state.oversold_score
            + 0.3 * state.fundamental_confidence
            + 0.4 * state.catalyst_strength)
            / 100.0,
    );
}

/// Stage D: pull the fundamental confidence into the state
///
/// Missing fundamentals contribute zero confidence.
pub fn fundamental_confidence(
    fundamental: Option<&FundamentalAssessment>,
    state: &mut CorrectionState,
) {
    state.fundamental_confidence = fundamental.map_or(0.0, |f| f.confidence);
}
