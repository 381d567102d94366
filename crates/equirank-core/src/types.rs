//! Signal snapshots, statements, and market context types

use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reporting cadence of a statement sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementCadence {
    Quarterly,
    Annual,
}

/// One periodic financial statement, immutable once fetched
///
/// Sequences are ordered descending by `period_end` (latest first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatementSnapshot {
    pub period_end: NaiveDate,
    pub revenue: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub operating_income: f64,
}

impl StatementSnapshot {
    /// Shareholder equity (assets minus liabilities)
    pub fn net_worth(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }

    /// Net margin in percent; `None` when revenue is zero
    pub fn profit_margin(&self) -> Option<f64> {
        if self.revenue == 0.0 {
            None
        } else {
            Some(self.net_income / self.revenue * 100.0)
        }
    }
}

/// Price trend classification relative to its moving averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

/// Technical indicator snapshot, freshly computed per call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    /// RSI(14), Wilder smoothing, 0-100
    pub rsi14: f64,
    pub sma20: f64,
    pub sma50: f64,
    /// Position of the close within the Bollinger(20, 2) bands, 0-1
    pub bollinger_position: f64,
    /// ATR(14) as a rolling mean of true range
    pub atr14: f64,
    /// Latest volume over the 20-bar mean volume
    pub volume_ratio: f64,
    /// 5-day close-over-close change, percent
    pub momentum_5d: f64,
    /// 10-day close-over-close change, percent
    pub momentum_10d: f64,
    pub trend_direction: TrendDirection,
}

/// Financial health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Distressed,
}

/// Fundamentals-derived assessment of an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalAssessment {
    /// Quarter-over-same-quarter-prior-year revenue growth, percent.
    /// `None` when the prior-year quarter is missing or zero.
    pub quarterly_growth_yoy: Option<f64>,
    /// Year-over-year annual revenue growth, percent
    pub annual_growth_yoy: Option<f64>,
    /// Latest-quarter net margin, percent
    pub profit_margin: Option<f64>,
    /// Liabilities over equity; `None` when equity is not positive
    pub debt_to_equity: Option<f64>,
    pub is_profitable: bool,
    pub net_worth_positive: bool,
    pub health_status: HealthStatus,
    /// Bucketed confidence contribution, 0-100
    pub confidence: f64,
}

/// Directional read of an opinion or fact set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// Trading recommendation attached to a catalyst opinion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

/// Static instrument facts the risk filters need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Market capitalization in the provider's reporting unit
    pub market_cap: f64,
    pub beta: f64,
    /// Trailing average daily share volume
    pub avg_daily_volume: f64,
    pub current_ratio: f64,
    /// Months since listing
    pub listed_months: u32,
    pub sector: String,
}

/// Market-wide context for regime classification and emergency safeguards
///
/// Every field is optional or empty-able: a missing proxy degrades the
/// affected adjustment to neutral, it never aborts the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketContext {
    /// Broad index proxy series
    pub index: Option<PriceSeries>,
    /// Sector proxy series for the instrument's sector
    pub sector: Option<PriceSeries>,
    /// Volatility proxy level (VIX-like)
    pub volatility_proxy: Option<f64>,
    /// Latest earnings surprise vs consensus, percent
    pub earnings_surprise_pct: Option<f64>,
    /// Scandal keywords matched in recent news for this instrument
    pub scandal_hits: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_derived_fields() {
        let snapshot = StatementSnapshot {
            period_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            revenue: 200.0,
            net_income: 30.0,
            total_assets: 500.0,
            total_liabilities: 350.0,
            operating_income: 40.0,
        };
        assert_eq!(snapshot.net_worth(), 150.0);
        assert!((snapshot.profit_margin().unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_revenue_margin_is_none() {
        let snapshot = StatementSnapshot {
            period_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            revenue: 0.0,
            net_income: -5.0,
            total_assets: 100.0,
            total_liabilities: 40.0,
            operating_income: -5.0,
        };
        assert!(snapshot.profit_margin().is_none());
    }

    #[test]
    fn test_sentiment_serde_casing() {
        let json = serde_json::to_string(&Sentiment::Bullish).unwrap();
        assert_eq!(json, "\"bullish\"");
        let json = serde_json::to_string(&Recommendation::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
    }
}
