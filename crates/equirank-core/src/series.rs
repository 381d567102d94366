//! Price history types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// An ordered series of OHLCV bars with strictly increasing timestamps
///
/// Transient by design: fetched, analyzed, discarded. The constructor is the
/// only way in, so downstream code can rely on the ordering invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Candle>,
}

impl PriceSeries {
    /// Build a series, validating the timestamp ordering invariant
    pub fn new(bars: Vec<Candle>) -> Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(Error::MalformedInput(format!(
                    "price series timestamps not strictly increasing at {}",
                    pair[1].timestamp
                )));
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Candle] {
        &self.bars
    }

    /// Most recent bar, if any
    pub fn latest(&self) -> Option<&Candle> {
        self.bars.last()
    }

    /// Last `n` bars (or the whole series when shorter)
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Simple percent change of the latest close vs the close `n` bars back
    ///
    /// Returns `None` when the series is too short or the reference close
    /// is zero.
    pub fn pct_change(&self, n: usize) -> Option<f64> {
        if self.bars.len() <= n {
            return None;
        }
        let latest = self.bars[self.bars.len() - 1].close;
        let prior = self.bars[self.bars.len() - 1 - n].close;
        if prior == 0.0 {
            return None;
        }
        Some((latest - prior) / prior * 100.0)
    }
}
