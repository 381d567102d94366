//! End-to-end pipeline tests over stub providers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};

use equirank_catalyst::{
    CatalystAssessmentProvider, CatalystOpinion, CatalystOutcome, CitedFact,
    DEFAULT_REQUIRED_FIELDS, FactPackage, FactValue, score_from_facts,
};
use equirank_core::{
    Candle, CorrectionPhase, Error, InstrumentProfile, PriceSeries, Provenance, Recommendation,
    Result, StatementCadence, StatementSnapshot,
};
use equirank_engine::{MarketDataProvider, RankConfig, RankEngine, RankingFlag};

const KNOWN_INSTRUMENT: &str = "ACME";

fn bars(specs: &[(f64, f64, f64, f64, u64)]) -> PriceSeries {
    let candles = specs
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + ChronoDuration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect();
    PriceSeries::new(candles).unwrap()
}

/// A 23% pullback off a 130 high: long plateau, sharp descent, five gentle
/// declining closes into a hammer on heavy volume. Deep enough to detect,
/// declining long enough to confirm, and quiet enough at the bottom to
/// read as consolidation.
fn dip_series() -> PriceSeries {
    let mut specs = Vec::new();
    for _ in 0..40 {
        specs.push((130.0, 130.5, 129.5, 130.0, 100_000));
    }
    for &close in &[126.0, 122.0, 118.0, 114.0, 110.0, 107.0, 105.0, 104.0, 103.0, 102.0] {
        specs.push((close + 1.0, close + 1.5, close - 0.5, close, 100_000));
    }
    for &close in &[101.6, 101.3, 101.0, 100.7, 100.4] {
        specs.push((close, close + 0.2, close - 0.2, close, 100_000));
    }
    specs.push((99.7, 100.1, 98.5, 100.0, 300_000));
    bars(&specs)
}

fn flat_index() -> PriceSeries {
    bars(&vec![(5_000.0, 5_010.0, 4_990.0, 5_000.0, 1_000_000); 55])
}

fn crashing_index() -> PriceSeries {
    let mut specs = vec![(5_000.0, 5_010.0, 4_990.0, 5_000.0, 1_000_000); 54];
    specs.push((5_000.0, 5_000.0, 4_600.0, 4_650.0, 1_000_000)); // -7.0% daily
    bars(&specs)
}

fn statement(period_end: NaiveDate, revenue: f64) -> StatementSnapshot {
    StatementSnapshot {
        period_end,
        revenue,
        net_income: revenue * 0.125,
        total_assets: 500.0,
        total_liabilities: 100.0,
        operating_income: revenue * 0.15,
    }
}

fn quarterly_statements() -> Vec<StatementSnapshot> {
    // Latest first; 20% growth over the same quarter a year earlier
    [
        (2025, 6, 30, 120.0),
        (2025, 3, 31, 115.0),
        (2024, 12, 31, 110.0),
        (2024, 9, 30, 105.0),
        (2024, 6, 30, 100.0),
    ]
    .iter()
    .map(|&(y, m, d, revenue)| statement(NaiveDate::from_ymd_opt(y, m, d).unwrap(), revenue))
    .collect()
}

fn annual_statements() -> Vec<StatementSnapshot> {
    [(2024, 12, 31, 430.0), (2023, 12, 31, 390.0)]
        .iter()
        .map(|&(y, m, d, revenue)| statement(NaiveDate::from_ymd_opt(y, m, d).unwrap(), revenue))
        .collect()
}

fn clean_profile() -> InstrumentProfile {
    InstrumentProfile {
        market_cap: 10_000.0,
        beta: 1.0,
        avg_daily_volume: 500_000.0,
        current_ratio: 1.5,
        listed_months: 60,
        sector: "technology".to_string(),
    }
}

/// Market stub serving one known instrument
struct StubMarket {
    series: PriceSeries,
    profile: InstrumentProfile,
    index: PriceSeries,
}

impl StubMarket {
    fn new(index: PriceSeries) -> Self {
        Self {
            series: dip_series(),
            profile: clean_profile(),
            index,
        }
    }

    fn check_known(&self, instrument_id: &str) -> Result<()> {
        if instrument_id == KNOWN_INSTRUMENT {
            Ok(())
        } else {
            Err(Error::DataUnavailable {
                instrument: instrument_id.to_string(),
                reason: "unknown instrument".to_string(),
            })
        }
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn price_series(&self, instrument_id: &str, _lookback_days: u32) -> Result<PriceSeries> {
        self.check_known(instrument_id)?;
        Ok(self.series.clone())
    }

    async fn statements(
        &self,
        instrument_id: &str,
        cadence: StatementCadence,
    ) -> Result<Vec<StatementSnapshot>> {
        self.check_known(instrument_id)?;
        Ok(match cadence {
            StatementCadence::Quarterly => quarterly_statements(),
            StatementCadence::Annual => annual_statements(),
        })
    }

    async fn current_price(&self, instrument_id: &str) -> Result<(f64, DateTime<Utc>)> {
        self.check_known(instrument_id)?;
        let latest = self.series.latest().ok_or_else(|| Error::DataUnavailable {
            instrument: instrument_id.to_string(),
            reason: "empty series".to_string(),
        })?;
        Ok((latest.close, latest.timestamp))
    }

    async fn instrument_profile(&self, instrument_id: &str) -> Result<InstrumentProfile> {
        self.check_known(instrument_id)?;
        Ok(self.profile.clone())
    }

    async fn index_series(&self, _lookback_days: u32) -> Result<PriceSeries> {
        Ok(self.index.clone())
    }

    async fn sector_series(&self, _sector: &str, _lookback_days: u32) -> Result<PriceSeries> {
        Err(Error::DataUnavailable {
            instrument: "sector".to_string(),
            reason: "no sector proxy".to_string(),
        })
    }

    async fn volatility_proxy(&self) -> Result<f64> {
        Ok(15.0)
    }

    async fn earnings_surprise(&self, _instrument_id: &str) -> Result<Option<f64>> {
        Ok(None)
    }

    async fn scandal_hits(&self, _instrument_id: &str, _keywords: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "stub-market"
    }
}

/// Catalyst stub that answers with the deterministic read of the facts
///
/// Always grounded by construction: cites every supplied fact, uses no
/// numbers in its reasoning, and mirrors the deterministic sentiment.
struct EchoCatalyst;

#[async_trait]
impl CatalystAssessmentProvider for EchoCatalyst {
    async fn assess(
        &self,
        _instrument_id: &str,
        facts: &FactPackage,
        _instruction: &str,
    ) -> Result<CatalystOutcome> {
        let deterministic = score_from_facts(facts, DEFAULT_REQUIRED_FIELDS);
        let cited_facts = facts
            .fields()
            .map(|(field, value)| CitedFact {
                field: field.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(CatalystOutcome::Opinion(CatalystOpinion {
            score: deterministic.score,
            sentiment: deterministic.sentiment,
            catalysts: ["earnings".to_string()].into(),
            risks: Default::default(),
            certainty: 85.0,
            recommendation: Recommendation::Buy,
            cited_facts,
            reasoning: "The supplied earnings and momentum facts support the move.".to_string(),
        }))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Catalyst stub that never answers within any reasonable deadline
struct SlowCatalyst;

#[async_trait]
impl CatalystAssessmentProvider for SlowCatalyst {
    async fn assess(
        &self,
        _instrument_id: &str,
        _facts: &FactPackage,
        _instruction: &str,
    ) -> Result<CatalystOutcome> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(CatalystOutcome::Unavailable)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Catalyst stub citing a fact that was never supplied
struct UngroundedCatalyst;

#[async_trait]
impl CatalystAssessmentProvider for UngroundedCatalyst {
    async fn assess(
        &self,
        _instrument_id: &str,
        facts: &FactPackage,
        _instruction: &str,
    ) -> Result<CatalystOutcome> {
        let deterministic = score_from_facts(facts, DEFAULT_REQUIRED_FIELDS);
        Ok(CatalystOutcome::Opinion(CatalystOpinion {
            score: deterministic.score,
            sentiment: deterministic.sentiment,
            catalysts: Default::default(),
            risks: Default::default(),
            certainty: 90.0,
            recommendation: Recommendation::Buy,
            cited_facts: vec![CitedFact {
                field: "insider_buying".to_string(),
                value: FactValue::Flag(true),
            }],
            reasoning: "Insider buying signals conviction.".to_string(),
        }))
    }

    fn name(&self) -> &str {
        "ungrounded"
    }
}

fn engine(
    market: StubMarket,
    catalyst: impl CatalystAssessmentProvider + 'static,
) -> RankEngine {
    equirank_utils::init_tracing();
    RankEngine::new(
        Arc::new(market),
        Arc::new(catalyst),
        RankConfig::default(),
    )
    .unwrap()
}

/// Facts that score deterministically bullish so the echoed opinion is
/// accepted and strong enough for the catalyst-strength stage
fn bullish_facts() -> FactPackage {
    FactPackage::new()
        .with("catalyst_type", "earnings")
        .with("earnings_growth_pct", 28.0)
        .with("rsi14", 25.0)
        .with("trend", "sideways")
        .with("momentum_5d", 2.0)
        .with("volume_ratio", 1.0)
}

#[tokio::test]
async fn test_happy_path_applies_correction_boost() {
    let engine = engine(StubMarket::new(flat_index()), EchoCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[bullish_facts()]).await;

    assert_eq!(ranked.evidence_count, 1);
    assert_eq!(ranked.observations[0].provenance, Provenance::Validated);
    assert!(ranked.technical.is_some());
    assert!(ranked.fundamental.is_some());

    let correction = ranked.correction.as_ref().unwrap();
    assert_eq!(correction.phase, CorrectionPhase::BoostApplied);
    assert!(correction.confirmed);
    assert!(correction.boost_points > 0.0);
    assert!((10.0..=35.0).contains(&correction.correction_pct));
    assert!(correction.risk_passed);
    assert!(ranked.notes.iter().any(|n| n.contains("boost applied")));
    assert!((0.0..=100.0).contains(&ranked.hybrid_score));
}

#[tokio::test]
async fn test_emergency_veto_overrides_confidence() {
    let engine = engine(StubMarket::new(crashing_index()), EchoCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[bullish_facts()]).await;

    let correction = ranked.correction.as_ref().unwrap();
    assert_eq!(correction.phase, CorrectionPhase::Rejected);
    assert_eq!(correction.rejection_reason.as_deref(), Some("emergency_veto"));
    assert_eq!(correction.boost_points, 0.0);
    // The veto fired even though the earlier stages all passed
    assert!(correction.risk_passed);
    assert!(correction.blended_confidence > 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_catalyst_timeout_degrades_to_fallback() {
    let engine = engine(StubMarket::new(flat_index()), SlowCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[bullish_facts()]).await;

    assert_eq!(ranked.evidence_count, 1);
    let observation = &ranked.observations[0];
    assert_eq!(observation.provenance, Provenance::Fallback);
    assert!(observation
        .notes
        .iter()
        .any(|n| n.contains("catalyst assessment failed")));
    // Fallback path still yields a complete, bounded result
    assert!((0.0..=100.0).contains(&ranked.hybrid_score));
}

#[tokio::test]
async fn test_ungrounded_opinion_substituted() {
    let engine = engine(StubMarket::new(flat_index()), UngroundedCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[bullish_facts()]).await;

    let observation = &ranked.observations[0];
    assert_eq!(observation.provenance, Provenance::Fallback);
    assert!(observation
        .notes
        .iter()
        .any(|n| n.contains("insider_buying")));
    // The substituted score is the deterministic one
    assert_eq!(observation.catalyst_score, observation.fallback_score);
}

#[tokio::test]
async fn test_missing_market_data_never_aborts() {
    let engine = engine(StubMarket::new(flat_index()), EchoCatalyst);
    let ranked = engine.evaluate("GHOST", &[bullish_facts()]).await;

    assert!(ranked.technical.is_none());
    assert!(ranked.fundamental.is_none());
    assert!(ranked.correction.is_none());
    assert!(ranked
        .notes
        .iter()
        .any(|n| n.contains("price data unavailable")));
    // The catalyst observation alone still produces a score
    assert_eq!(ranked.evidence_count, 1);
    assert!(ranked.hybrid_score > 0.0);
}

#[tokio::test]
async fn test_batch_continues_past_failures_and_flags_overconfidence() {
    let engine = engine(StubMarket::new(flat_index()), EchoCatalyst);
    let (ranked, report) = engine
        .rank_batch(vec![
            (KNOWN_INSTRUMENT.to_string(), vec![bullish_facts()]),
            ("GHOST".to_string(), vec![bullish_facts()]),
        ])
        .await;

    assert_eq!(ranked.len(), 2);
    assert!(ranked.windows(2).all(|w| w[0].hybrid_score >= w[1].hybrid_score));

    // GHOST carries high certainty on observations alone
    assert!(report.flags.iter().any(|f| matches!(
        f,
        RankingFlag::OverconfidentSparseData { instrument_id, .. } if instrument_id == "GHOST"
    )));
}

#[tokio::test]
async fn test_risk_filter_gates_the_boost() {
    let mut market = StubMarket::new(flat_index());
    market.profile.market_cap = 100.0; // micro cap
    let engine = engine(market, EchoCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[bullish_facts()]).await;

    let correction = ranked.correction.as_ref().unwrap();
    assert_eq!(correction.phase, CorrectionPhase::Rejected);
    assert_eq!(
        correction.rejection_reason.as_deref(),
        Some("risk_filter:market_cap")
    );
    assert!(!correction.risk_passed);
    assert_eq!(correction.boost_points, 0.0);
}

#[tokio::test]
async fn test_no_observations_still_produces_result() {
    let engine = engine(StubMarket::new(flat_index()), EchoCatalyst);
    let ranked = engine.evaluate(KNOWN_INSTRUMENT, &[]).await;

    assert_eq!(ranked.evidence_count, 0);
    assert_eq!(ranked.hybrid_score, 0.0);
    assert!(ranked.technical.is_some());
}
