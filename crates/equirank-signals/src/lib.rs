//! Deterministic signal engines
//!
//! Pure computations over price history and financial statements:
//!
//! - [`technical::compute_technical`] - RSI, Bollinger position, ATR, SMA
//!   distances, volume ratio, momentum
//! - [`fundamental::evaluate_fundamentals`] - growth, margin, leverage,
//!   health classification
//! - [`patterns::bullish_reversal_pattern`] - candlestick recognizers used
//!   by reversal confirmation
//!
//! No async, no I/O, no shared state: identical inputs always produce
//! identical outputs.

pub mod fundamental;
pub mod patterns;
pub mod technical;

pub use fundamental::evaluate_fundamentals;
pub use patterns::bullish_reversal_pattern;
pub use technical::{MIN_BARS, compute_technical, rsi_last_two};
