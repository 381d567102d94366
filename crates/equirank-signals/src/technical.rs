//! Technical indicator engine

use equirank_core::{PriceSeries, TechnicalSnapshot, TrendDirection, clamp01};
use ta::{
    Next,
    indicators::{BollingerBands, RelativeStrengthIndex, SimpleMovingAverage},
};

/// Minimum bars required before any snapshot is produced
pub const MIN_BARS: usize = 50;

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const BOLLINGER_PERIOD: usize = 20;
const VOLUME_WINDOW: usize = 20;

/// Compute a full technical snapshot for the series
///
/// Returns `None` below [`MIN_BARS`] bars - insufficient data, not an error.
/// Deterministic: the same series always yields the same snapshot.
pub fn compute_technical(series: &PriceSeries) -> Option<TechnicalSnapshot> {
    if series.len() < MIN_BARS {
        tracing::debug!(bars = series.len(), "insufficient history for technical snapshot");
        return None;
    }

    let closes = series.closes();
    let close = *closes.last()?;

    let (_, rsi14) = rsi_last_two(series)?;
    let sma20 = sma_last(&closes, 20)?;
    let sma50 = sma_last(&closes, 50)?;
    let bollinger_position = bollinger_position(&closes, close)?;
    let atr14 = rolling_mean_true_range(series);
    let volume_ratio = volume_ratio(&series.volumes());
    let momentum_5d = series.pct_change(5).unwrap_or(0.0);
    let momentum_10d = series.pct_change(10).unwrap_or(0.0);

    let trend_direction = if close > sma20 && sma20 > sma50 {
        TrendDirection::Up
    } else if close < sma20 && sma20 < sma50 {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    };

    Some(TechnicalSnapshot {
        rsi14,
        sma20,
        sma50,
        bollinger_position,
        atr14,
        volume_ratio,
        momentum_5d,
        momentum_10d,
        trend_direction,
    })
}

/// RSI(14) for the prior and latest bar, Wilder smoothing
///
/// The pair lets callers detect a cross above 50 between consecutive bars.
/// Returns `None` when the series is shorter than two bars.
pub fn rsi_last_two(series: &PriceSeries) -> Option<(f64, f64)> {
    let closes = series.closes();
    if closes.len() < 2 {
        return None;
    }
    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).ok()?;
    let mut prev = 50.0;
    let mut last = 50.0;
    for &close in &closes {
        prev = last;
        last = rsi.next(close);
    }
    Some((prev, last))
}

fn sma_last(closes: &[f64], period: usize) -> Option<f64> {
    let mut sma = SimpleMovingAverage::new(period).ok()?;
    let mut value = 0.0;
    for &close in closes {
        value = sma.next(close);
    }
    Some(value)
}

/// Position of the close within the Bollinger(20, 2) bands, clamped to [0, 1]
///
/// Degenerate bands (flat price, upper == lower) map to the midpoint 0.5.
fn bollinger_position(closes: &[f64], close: f64) -> Option<f64> {
    let mut bb = BollingerBands::new(BOLLINGER_PERIOD, 2.0).ok()?;
    let mut upper = 0.0;
    let mut lower = 0.0;
    for &c in closes {
        let out = bb.next(c);
        upper = out.upper;
        lower = out.lower;
    }
    let width = upper - lower;
    if width <= f64::EPSILON {
        return Some(0.5);
    }
    Some(clamp01((close - lower) / width))
}

/// ATR(14) as the rolling mean of true range over the last 14 bars
fn rolling_mean_true_range(series: &PriceSeries) -> f64 {
    let bars = series.bars();
    let mut ranges = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            let prev_close = bars[i - 1].close;
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        };
        ranges.push(tr);
    }
    let window = &ranges[ranges.len().saturating_sub(ATR_PERIOD)..];
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Latest volume over the 20-bar mean volume; zero-mean guard yields 1.0
fn volume_ratio(volumes: &[f64]) -> f64 {
    let Some(&latest) = volumes.last() else {
        return 1.0;
    };
    let window = &volumes[volumes.len().saturating_sub(VOLUME_WINDOW)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    if mean <= 0.0 { 1.0 } else { latest / mean }
}
