//! Bullish candlestick pattern recognizers
//!
//! Used by reversal confirmation as one of its four independent signals.
//! Only patterns with a clear single- or two-bar definition are recognized;
//! anything ambiguous counts as "no pattern".

use equirank_core::{Candle, PriceSeries};

/// Recognize a bullish reversal pattern on the latest bar(s)
///
/// Checks, in order: bullish engulfing, piercing line, hammer. Returns the
/// pattern name for the reason trail, or `None`.
pub fn bullish_reversal_pattern(series: &PriceSeries) -> Option<&'static str> {
    let bars = series.bars();
    let latest = bars.last()?;

    if bars.len() >= 2 {
        let prior = &bars[bars.len() - 2];
        if is_bullish_engulfing(prior, latest) {
            return Some("bullish_engulfing");
        }
        if is_piercing_line(prior, latest) {
            return Some("piercing_line");
        }
    }

    if is_hammer(latest) {
        return Some("hammer");
    }

    None
}

fn body(bar: &Candle) -> f64 {
    (bar.close - bar.open).abs()
}

fn is_green(bar: &Candle) -> bool {
    bar.close > bar.open
}

fn is_red(bar: &Candle) -> bool {
    bar.close < bar.open
}

/// Green body fully engulfing the prior red body
fn is_bullish_engulfing(prior: &Candle, latest: &Candle) -> bool {
    is_red(prior)
        && is_green(latest)
        && latest.open <= prior.close
        && latest.close >= prior.open
        && body(latest) > body(prior)
}

/// Green bar opening below the prior red close and closing above its body
/// midpoint (but not above its open, which would be an engulfing)
fn is_piercing_line(prior: &Candle, latest: &Candle) -> bool {
    let midpoint = (prior.open + prior.close) / 2.0;
    is_red(prior)
        && is_green(latest)
        && latest.open < prior.close
        && latest.close > midpoint
        && latest.close < prior.open
}

/// Small body at the top of the range with a long lower shadow
fn is_hammer(bar: &Candle) -> bool {
    let body = body(bar);
    if body <= f64::EPSILON {
        return false;
    }
    let lower_shadow = bar.open.min(bar.close) - bar.low;
    let upper_shadow = bar.high - bar.open.max(bar.close);
    lower_shadow >= 2.0 * body && upper_shadow <= body
}
