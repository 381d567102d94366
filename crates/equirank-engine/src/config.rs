//! Engine configuration

use std::time::Duration;

use equirank_catalyst::{DEFAULT_REQUIRED_FIELDS, ValidationPolicy};
use equirank_core::{Error, Result};

/// Default weight of the catalyst score in the per-observation blend
pub const DEFAULT_CATALYST_WEIGHT: f64 = 0.65;

/// Scanning for these in recent headlines drives the scandal circuit breaker
pub const DEFAULT_SCANDAL_KEYWORDS: &[&str] = &[
    "fraud",
    "investigation",
    "lawsuit",
    "restatement",
    "delisting",
    "default",
];

/// Configuration for the ranking engine
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Deadline applied to every provider call
    pub provider_timeout: Duration,
    /// TTL for price data caches
    pub realtime_ttl: Duration,
    /// TTL for statement and profile caches
    pub fundamental_ttl: Duration,
    /// Catalyst weight in the observation blend, 0.5-0.8
    pub catalyst_weight: f64,
    /// Price history lookback, in days
    pub lookback_days: u32,
    /// Fact fields the fallback scorer reads
    pub required_fact_fields: Vec<String>,
    /// Grounding policy for external opinions
    pub validation_policy: ValidationPolicy,
    /// Keywords that trip the scandal circuit breaker
    pub scandal_keywords: Vec<String>,
    /// Maximum instruments scored concurrently in a batch
    pub max_concurrency: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            realtime_ttl: Duration::from_secs(60),
            fundamental_ttl: Duration::from_secs(6 * 60 * 60),
            catalyst_weight: DEFAULT_CATALYST_WEIGHT,
            lookback_days: 180,
            required_fact_fields: DEFAULT_REQUIRED_FIELDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            validation_policy: ValidationPolicy::default(),
            scandal_keywords: DEFAULT_SCANDAL_KEYWORDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_concurrency: 8,
        }
    }
}

impl RankConfig {
    /// Create a builder for custom configuration
    pub fn builder() -> RankConfigBuilder {
        RankConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.5..=0.8).contains(&self.catalyst_weight) {
            return Err(Error::ConfigError(format!(
                "catalyst_weight must be in [0.5, 0.8], got {}",
                self.catalyst_weight
            )));
        }
        if self.lookback_days < 90 {
            return Err(Error::ConfigError(format!(
                "lookback_days must cover at least 90 days, got {}",
                self.lookback_days
            )));
        }
        if self.max_concurrency == 0 {
            return Err(Error::ConfigError(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.provider_timeout.is_zero() {
            return Err(Error::ConfigError(
                "provider_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`RankConfig`]
#[derive(Debug, Default)]
pub struct RankConfigBuilder {
    provider_timeout: Option<Duration>,
    realtime_ttl: Option<Duration>,
    fundamental_ttl: Option<Duration>,
    catalyst_weight: Option<f64>,
    lookback_days: Option<u32>,
    required_fact_fields: Option<Vec<String>>,
    validation_policy: Option<ValidationPolicy>,
    scandal_keywords: Option<Vec<String>>,
    max_concurrency: Option<usize>,
}

impl RankConfigBuilder {
    /// Set the provider call deadline
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Set the price cache TTL
    pub fn realtime_ttl(mut self, ttl: Duration) -> Self {
        self.realtime_ttl = Some(ttl);
        self
    }

    /// Set the statement and profile cache TTL
    pub fn fundamental_ttl(mut self, ttl: Duration) -> Self {
        self.fundamental_ttl = Some(ttl);
        self
    }

    /// Set the catalyst blend weight
    pub fn catalyst_weight(mut self, weight: f64) -> Self {
        self.catalyst_weight = Some(weight);
        self
    }

    /// Set the price history lookback in days
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set the fact fields the fallback scorer reads
    pub fn required_fact_fields(mut self, fields: Vec<String>) -> Self {
        self.required_fact_fields = Some(fields);
        self
    }

    /// Set the grounding policy for external opinions
    pub fn validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validation_policy = Some(policy);
        self
    }

    /// Set the scandal circuit-breaker keywords
    pub fn scandal_keywords(mut self, keywords: Vec<String>) -> Self {
        self.scandal_keywords = Some(keywords);
        self
    }

    /// Set the batch concurrency limit
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<RankConfig> {
        let defaults = RankConfig::default();
        let config = RankConfig {
            provider_timeout: self.provider_timeout.unwrap_or(defaults.provider_timeout),
            realtime_ttl: self.realtime_ttl.unwrap_or(defaults.realtime_ttl),
            fundamental_ttl: self.fundamental_ttl.unwrap_or(defaults.fundamental_ttl),
            catalyst_weight: self.catalyst_weight.unwrap_or(defaults.catalyst_weight),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            required_fact_fields: self
                .required_fact_fields
                .unwrap_or(defaults.required_fact_fields),
            validation_policy: self.validation_policy.unwrap_or(defaults.validation_policy),
            scandal_keywords: self.scandal_keywords.unwrap_or(defaults.scandal_keywords),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
        };
        config.validate()?;
        Ok(config)
    }
}
