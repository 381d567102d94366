//! Scoring, validation, and aggregation engine
//!
//! This crate wires the pure signal engines and the catalyst boundary into
//! the full per-instrument pipeline:
//!
//! 1. Fetch market data through [`MarketDataProvider`] (cached, with a
//!    caller-set timeout)
//! 2. Compute technical and fundamental snapshots
//! 3. Assess each catalyst observation, validating or substituting the
//!    external opinion
//! 4. Run the staged correction-boost pipeline ([`correction`])
//! 5. Blend per-observation scores and aggregate per instrument
//!    ([`aggregate`])
//! 6. Rank instruments and run the read-only sanity pass ([`ranking`])
//!
//! Nothing in here is fatal per instrument: every degradation (timeout,
//! missing data, rejected opinion, failed gate) becomes a note on the
//! result, and a batch always continues past any single failure.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod correction;
pub mod engine;
pub mod provider;
pub mod ranking;

pub use cache::{CacheKey, MarketCache, MarketCaches};
pub use config::{RankConfig, RankConfigBuilder};
pub use correction::{CorrectionInputs, run_pipeline};
pub use engine::RankEngine;
pub use provider::MarketDataProvider;
pub use ranking::{RankingFlag, RankingReport, rank};
