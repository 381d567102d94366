//! Market data provider trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use equirank_core::{
    InstrumentProfile, PriceSeries, Result, StatementCadence, StatementSnapshot,
};

/// Trait for market data providers
///
/// Implementations wrap whatever data vendor backs the deployment. Every
/// method may fail with `DataUnavailable`; callers degrade the affected
/// sub-score instead of aborting, and enforce their own deadline on top of
/// each call.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily price history for the instrument, oldest bar first
    async fn price_series(&self, instrument_id: &str, lookback_days: u32) -> Result<PriceSeries>;

    /// Financial statement sequence, latest period first
    async fn statements(
        &self,
        instrument_id: &str,
        cadence: StatementCadence,
    ) -> Result<Vec<StatementSnapshot>>;

    /// Live price and its timestamp
    async fn current_price(&self, instrument_id: &str) -> Result<(f64, DateTime<Utc>)>;

    /// Static instrument facts (market cap, beta, listing age, sector, ...)
    async fn instrument_profile(&self, instrument_id: &str) -> Result<InstrumentProfile>;

    /// Broad market index proxy series
    async fn index_series(&self, lookback_days: u32) -> Result<PriceSeries>;

    /// Sector proxy series for a named sector
    async fn sector_series(&self, sector: &str, lookback_days: u32) -> Result<PriceSeries>;

    /// Market volatility proxy level (VIX-like)
    async fn volatility_proxy(&self) -> Result<f64>;

    /// Latest earnings surprise vs consensus, percent, when known
    async fn earnings_surprise(&self, instrument_id: &str) -> Result<Option<f64>>;

    /// Scandal keywords matched in recent news for the instrument
    async fn scandal_hits(&self, instrument_id: &str, keywords: &[String]) -> Result<Vec<String>>;

    /// Provider name for logs ("yahoo", "fixture", ...)
    fn name(&self) -> &str;
}
