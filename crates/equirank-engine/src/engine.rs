//! Per-instrument evaluation engine
//!
//! [`RankEngine`] owns the provider handles, the caches, and the config,
//! and drives one instrument end to end: fetch, signal computation,
//! catalyst assessment, correction-boost, aggregation. `evaluate` is
//! infallible by contract - every failure along the way degrades to a
//! neutral or fallback sub-score with a note, and the instrument still
//! produces a complete [`RankedObservation`] or none at all.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, future::join_all, stream};
use serde_json::json;

use equirank_catalyst::{
    CatalystAssessmentProvider, CatalystOutcome, FactPackage, ValidationOutcome, fallback_opinion,
    instruction_for, score_from_facts, validate_or_substitute,
};
use equirank_core::{
    Error, FundamentalAssessment, InstrumentProfile, MarketContext, PriceSeries, Provenance,
    RankedObservation, Result, ScoredObservation, StatementCadence, TechnicalSnapshot,
    TrendDirection, clamp,
};
use equirank_signals::{compute_technical, evaluate_fundamentals};

use crate::aggregate;
use crate::cache::{CacheKey, MarketCaches};
use crate::config::RankConfig;
use crate::correction::{CorrectionInputs, run_pipeline};
use crate::provider::MarketDataProvider;
use crate::ranking::{RankingReport, rank};

/// The scoring engine
pub struct RankEngine {
    market: Arc<dyn MarketDataProvider>,
    catalyst: Arc<dyn CatalystAssessmentProvider>,
    config: RankConfig,
    caches: MarketCaches,
}

impl RankEngine {
    /// Create an engine over the given providers
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        catalyst: Arc<dyn CatalystAssessmentProvider>,
        config: RankConfig,
    ) -> Result<Self> {
        config.validate()?;
        let caches = MarketCaches::new(config.realtime_ttl, config.fundamental_ttl);
        Ok(Self {
            market,
            catalyst,
            config,
            caches,
        })
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Evaluate one instrument from its catalyst observations
    ///
    /// Never fails: missing data, timeouts, and rejected opinions all
    /// degrade to notes on the result. Aggregation waits for every
    /// observation score before it runs.
    pub async fn evaluate(
        &self,
        instrument_id: &str,
        observations: &[FactPackage],
    ) -> RankedObservation {
        let mut notes = Vec::new();

        let series = match self.fetch_series(instrument_id).await {
            Ok(series) => Some(series),
            Err(err) => {
                notes.push(format!("price data unavailable: {err}"));
                None
            }
        };
        let technical = series.as_ref().and_then(compute_technical);
        if series.is_some() && technical.is_none() {
            notes.push("insufficient price history for technical snapshot".to_string());
        }

        let fundamental = self.fetch_fundamentals(instrument_id, &mut notes).await;
        let profile = match self.fetch_profile(instrument_id).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                notes.push(format!("instrument profile unavailable: {err}"));
                None
            }
        };

        let alpha = technical.as_ref().map(aggregate::technical_alpha);
        let scoring = observations.iter().map(|facts| {
            self.score_observation(instrument_id, facts, technical.as_ref(), alpha, fundamental.as_ref())
        });
        // Barrier: the aggregate never sees a partial observation set
        let mut scored: Vec<ScoredObservation> = join_all(scoring).await;

        let base_hybrid = aggregate::instrument_score(&scored);

        let correction = match (&series, &technical) {
            (Some(series), Some(technical)) => {
                let market = self
                    .market_context(instrument_id, profile.as_ref(), &mut notes)
                    .await;
                let state = run_pipeline(&CorrectionInputs {
                    series,
                    technical,
                    fundamental: fundamental.as_ref(),
                    catalyst: strongest_validated(&scored),
                    profile: profile.as_ref(),
                    market: &market,
                    base_hybrid,
                });
                if let Some(reason) = &state.rejection_reason {
                    notes.push(format!("correction boost rejected: {reason}"));
                }
                if state.boost_points > 0.0 {
                    for observation in &mut scored {
                        observation.score = clamp(observation.score + state.boost_points, 0.0, 100.0);
                    }
                    notes.push(format!(
                        "correction boost applied: +{:.1}",
                        state.boost_points
                    ));
                }
                Some(state)
            }
            _ => None,
        };

        let hybrid_score = aggregate::instrument_score(&scored);
        tracing::info!(
            instrument_id,
            hybrid_score,
            observations = scored.len(),
            "instrument evaluated"
        );

        RankedObservation {
            instrument_id: instrument_id.to_string(),
            hybrid_score,
            evidence_count: scored.len(),
            observations: scored,
            technical,
            fundamental,
            correction,
            notes,
        }
    }

    /// Evaluate a batch of instruments concurrently
    ///
    /// Instruments run independently up to the configured concurrency;
    /// one instrument failing to produce signals never stops the others.
    pub async fn evaluate_batch(
        &self,
        batch: Vec<(String, Vec<FactPackage>)>,
    ) -> Vec<RankedObservation> {
        stream::iter(batch.into_iter().map(|(instrument_id, observations)| async move {
            self.evaluate(&instrument_id, &observations).await
        }))
        .buffer_unordered(self.config.max_concurrency)
        .collect()
        .await
    }

    /// Evaluate a batch and rank the results
    pub async fn rank_batch(
        &self,
        batch: Vec<(String, Vec<FactPackage>)>,
    ) -> (Vec<RankedObservation>, RankingReport) {
        rank(self.evaluate_batch(batch).await)
    }

    /// Score one catalyst observation
    ///
    /// The fallback score is always computed: it is both the substitute on
    /// rejection and the grounding reference the validator compares the
    /// external opinion against.
    async fn score_observation(
        &self,
        instrument_id: &str,
        facts: &FactPackage,
        technical: Option<&TechnicalSnapshot>,
        alpha: Option<f64>,
        fundamental: Option<&FundamentalAssessment>,
    ) -> ScoredObservation {
        let facts = enrich_facts(facts.clone(), technical);
        let required: Vec<&str> = self
            .config
            .required_fact_fields
            .iter()
            .map(String::as_str)
            .collect();
        let fallback = score_from_facts(&facts, &required);

        let mut notes = Vec::new();
        let (opinion, provenance) = match self.assess_catalyst(instrument_id, &facts).await {
            Ok(CatalystOutcome::Opinion(opinion)) => {
                match validate_or_substitute(
                    opinion,
                    &facts,
                    &fallback,
                    &self.config.validation_policy,
                ) {
                    ValidationOutcome::Accepted(opinion) => (opinion, Provenance::Validated),
                    ValidationOutcome::Substituted { opinion, violations } => {
                        for violation in &violations {
                            notes.push(format!("opinion rejected: {violation}"));
                        }
                        (opinion, Provenance::Fallback)
                    }
                }
            }
            Ok(CatalystOutcome::Unparseable(raw)) => {
                notes.push(format!(
                    "unparseable catalyst response ({} bytes), fallback used",
                    raw.len()
                ));
                (fallback_opinion(&facts, &fallback), Provenance::Fallback)
            }
            Ok(CatalystOutcome::Unavailable) => {
                notes.push("catalyst provider unavailable, fallback used".to_string());
                (fallback_opinion(&facts, &fallback), Provenance::Fallback)
            }
            Err(err) => {
                notes.push(format!("catalyst assessment failed ({err}), fallback used"));
                (fallback_opinion(&facts, &fallback), Provenance::Fallback)
            }
        };

        let score = aggregate::observation_score(
            opinion.score,
            opinion.certainty,
            alpha,
            fundamental,
            self.config.catalyst_weight,
        );

        ScoredObservation {
            score,
            catalyst_score: opinion.score,
            certainty: opinion.certainty,
            provenance,
            sentiment: opinion.sentiment,
            catalysts: opinion.catalysts,
            fallback_score: fallback.score,
            notes,
        }
    }

    /// Render the instruction and call the catalyst provider with a deadline
    async fn assess_catalyst(
        &self,
        instrument_id: &str,
        facts: &FactPackage,
    ) -> Result<CatalystOutcome> {
        let instruction = instruction_for(instrument_id, facts)?;
        self.with_deadline(
            self.catalyst.name(),
            self.catalyst.assess(instrument_id, facts, &instruction),
        )
        .await
    }

    async fn fetch_series(&self, instrument_id: &str) -> Result<PriceSeries> {
        let key = CacheKey::new(
            instrument_id,
            "series",
            json!({ "lookback": self.config.lookback_days, "day": Utc::now().date_naive() }),
        );
        self.caches
            .series
            .get_or_fetch(key, || {
                self.with_deadline(
                    self.market.name(),
                    self.market
                        .price_series(instrument_id, self.config.lookback_days),
                )
            })
            .await
    }

    async fn fetch_statements(
        &self,
        instrument_id: &str,
        cadence: StatementCadence,
    ) -> Result<Vec<equirank_core::StatementSnapshot>> {
        let key = CacheKey::new(
            instrument_id,
            "statements",
            json!({ "cadence": cadence, "day": Utc::now().date_naive() }),
        );
        self.caches
            .statements
            .get_or_fetch(key, || {
                self.with_deadline(
                    self.market.name(),
                    self.market.statements(instrument_id, cadence),
                )
            })
            .await
    }

    async fn fetch_profile(&self, instrument_id: &str) -> Result<InstrumentProfile> {
        let key = CacheKey::new(
            instrument_id,
            "profile",
            json!({ "day": Utc::now().date_naive() }),
        );
        self.caches
            .profiles
            .get_or_fetch(key, || {
                self.with_deadline(self.market.name(), self.market.instrument_profile(instrument_id))
            })
            .await
    }

    async fn fetch_fundamentals(
        &self,
        instrument_id: &str,
        notes: &mut Vec<String>,
    ) -> Option<FundamentalAssessment> {
        let quarterly = match self
            .fetch_statements(instrument_id, StatementCadence::Quarterly)
            .await
        {
            Ok(statements) => statements,
            Err(err) => {
                notes.push(format!("quarterly statements unavailable: {err}"));
                Vec::new()
            }
        };
        let annual = match self
            .fetch_statements(instrument_id, StatementCadence::Annual)
            .await
        {
            Ok(statements) => statements,
            Err(err) => {
                notes.push(format!("annual statements unavailable: {err}"));
                Vec::new()
            }
        };

        let fundamental = evaluate_fundamentals(&quarterly, &annual);
        if fundamental.is_none() {
            notes.push("no statements, fundamental assessment absent".to_string());
        }
        fundamental
    }

    /// Build the market context for regime and emergency stages
    ///
    /// Each piece degrades independently to absent; the pipeline then
    /// treats the affected adjustment as neutral.
    async fn market_context(
        &self,
        instrument_id: &str,
        profile: Option<&InstrumentProfile>,
        notes: &mut Vec<String>,
    ) -> MarketContext {
        let mut context = MarketContext::default();

        match self
            .with_deadline(
                self.market.name(),
                self.market.index_series(self.config.lookback_days),
            )
            .await
        {
            Ok(series) => context.index = Some(series),
            Err(err) => notes.push(format!("index proxy unavailable: {err}")),
        }

        if let Some(profile) = profile {
            match self
                .with_deadline(
                    self.market.name(),
                    self.market
                        .sector_series(&profile.sector, self.config.lookback_days),
                )
                .await
            {
                Ok(series) => context.sector = Some(series),
                Err(err) => notes.push(format!("sector proxy unavailable: {err}")),
            }
        }

        match self
            .with_deadline(self.market.name(), self.market.volatility_proxy())
            .await
        {
            Ok(proxy) => context.volatility_proxy = Some(proxy),
            Err(err) => notes.push(format!("volatility proxy unavailable: {err}")),
        }

        match self
            .with_deadline(
                self.market.name(),
                self.market.earnings_surprise(instrument_id),
            )
            .await
        {
            Ok(surprise) => context.earnings_surprise_pct = surprise,
            Err(err) => notes.push(format!("earnings surprise unavailable: {err}")),
        }

        match self
            .with_deadline(
                self.market.name(),
                self.market
                    .scandal_hits(instrument_id, &self.config.scandal_keywords),
            )
            .await
        {
            Ok(hits) => context.scandal_hits = hits,
            Err(err) => notes.push(format!("scandal scan unavailable: {err}")),
        }

        context
    }

    /// Enforce the configured deadline on a provider call
    async fn with_deadline<T>(
        &self,
        provider: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.provider_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(provider, "provider call exceeded deadline");
                Err(Error::ProviderTimeout {
                    provider: provider.to_string(),
                })
            }
        }
    }
}

/// Strongest validated observation as (catalyst score, certainty)
///
/// The correction pipeline's catalyst-strength stage only trusts opinions
/// that survived validation; fallback-backed observations do not count.
fn strongest_validated(observations: &[ScoredObservation]) -> Option<(f64, f64)> {
    observations
        .iter()
        .filter(|o| o.provenance == Provenance::Validated)
        .max_by(|a, b| a.catalyst_score.total_cmp(&b.catalyst_score))
        .map(|o| (o.catalyst_score, o.certainty))
}

/// Add the technical facts the fallback scorer and validator may need
///
/// Supplied fields win; enrichment only fills gaps, so a caller-provided
/// fact is never silently overwritten.
fn enrich_facts(mut facts: FactPackage, technical: Option<&TechnicalSnapshot>) -> FactPackage {
    let Some(technical) = technical else {
        return facts;
    };
    if facts.get("rsi14").is_none() {
        facts.insert("rsi14", technical.rsi14);
    }
    if facts.get("trend").is_none() {
        let trend = match technical.trend_direction {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Sideways => "sideways",
        };
        facts.insert("trend", trend);
    }
    if facts.get("momentum_5d").is_none() {
        facts.insert("momentum_5d", technical.momentum_5d);
    }
    if facts.get("volume_ratio").is_none() {
        facts.insert("volume_ratio", technical.volume_ratio);
    }
    facts
}
