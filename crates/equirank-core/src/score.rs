//! Bounded-score helpers
//!
//! Every score in the pipeline lives on a fixed interval (most on 0-100,
//! confidences on 0-1). These helpers are the single place clamping happens
//! so the bounds invariant holds everywhere.

/// Clamp a value into `[lo, hi]`
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Clamp a value into `[0, 1]`
pub fn clamp01(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Clamp a value into the canonical `[0, 100]` score range
pub fn clamp_score(value: f64) -> f64 {
    clamp(value, 0.0, 100.0)
}
