//! Payment engine configuration

use acquiring_core::{APIFailureError, ConfigError};
use acquiring_http::BackoffStrategy;
use std::time::Duration;

/// Shortest wait for an app-based 3DS challenge.
pub const MIN_CHALLENGE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Error code asking for a repeat `Init` with additional data.
pub const NEEDS_ADDITIONAL_DATA_CODE: i64 = 104;

/// `GetState` polling.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingConfig {
    pub max_attempts: u32,
    /// Delay before the next attempt, 0-indexed by the attempt just made.
    pub backoff: BackoffStrategy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: BackoffStrategy::Constant(Duration::from_secs(3)),
        }
    }
}

/// Decides which charge failures are recoverable with a repeat `Init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatInitPolicy {
    pub error_codes: Vec<i64>,
}

impl Default for RepeatInitPolicy {
    fn default() -> Self {
        Self {
            error_codes: vec![NEEDS_ADDITIONAL_DATA_CODE],
        }
    }
}

impl RepeatInitPolicy {
    pub fn requires_additional_data(&self, failure: &APIFailureError) -> bool {
        self.error_codes.contains(&failure.error_code)
    }
}

/// Payment engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfig {
    pub polling: PollingConfig,
    /// Raised to [`MIN_CHALLENGE_TIMEOUT`] when shorter.
    pub challenge_timeout: Duration,
    pub repeat_init: RepeatInitPolicy,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            challenge_timeout: MIN_CHALLENGE_TIMEOUT,
            repeat_init: RepeatInitPolicy::default(),
        }
    }
}

impl PaymentConfig {
    /// Effective app challenge timeout.
    pub fn effective_challenge_timeout(&self) -> Duration {
        self.challenge_timeout.max(MIN_CHALLENGE_TIMEOUT)
    }

    /// Load from `ACQUIRING_*` environment variables; unset values keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(acquiring_core::config::ENV_PREFIX, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name));
        let mut config = Self::default();

        if let Some(value) = var("POLLING_MAX_ATTEMPTS") {
            config.polling.max_attempts = parse("POLLING_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = var("POLLING_INTERVAL_MS") {
            let millis: u64 = parse("POLLING_INTERVAL_MS", &value)?;
            config.polling.backoff = BackoffStrategy::Constant(Duration::from_millis(millis));
        }
        if let Some(value) = var("CHALLENGE_TIMEOUT_SECS") {
            let secs: u64 = parse("CHALLENGE_TIMEOUT_SECS", &value)?;
            config.challenge_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = var("REPEAT_INIT_ERROR_CODES") {
            config.repeat_init.error_codes = value
                .split(',')
                .filter(|code| !code.trim().is_empty())
                .map(|code| parse("REPEAT_INIT_ERROR_CODES", code))
                .collect::<Result<_, _>>()?;
        }

        if config.polling.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "POLLING_MAX_ATTEMPTS".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(config)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}
