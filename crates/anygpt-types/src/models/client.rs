//! Per-call client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 4000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BASE_RETRY_DELAY_SECS: f64 = 0.5;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Knobs for a single `generate` call.
///
/// Read fresh for every call; the client never caches it. Zero values mean
/// "unset" and resolve to the defaults through the `effective_*` accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Input is truncated to this many characters
    pub max_input_length: usize,
    /// Extra attempts after the first one, retryable errors only
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_retry_delay_secs: f64,
    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
            base_retry_delay_secs: DEFAULT_BASE_RETRY_DELAY_SECS,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout_secs == 0 { DEFAULT_TIMEOUT_SECS } else { self.timeout_secs };
        Duration::from_secs(secs)
    }

    pub fn effective_max_input_length(&self) -> usize {
        if self.max_input_length == 0 {
            DEFAULT_MAX_INPUT_LENGTH
        } else {
            self.max_input_length
        }
    }

    /// Non-positive (or NaN) falls back to the default; the rest is clamped to 2.0.
    pub fn effective_temperature(&self) -> f32 {
        if self.temperature > 0.0 {
            self.temperature.min(MAX_TEMPERATURE)
        } else {
            DEFAULT_TEMPERATURE
        }
    }

    pub fn effective_max_output_tokens(&self) -> u32 {
        if self.max_output_tokens == 0 {
            DEFAULT_MAX_OUTPUT_TOKENS
        } else {
            self.max_output_tokens
        }
    }

    /// Negative or non-finite values disable the delay entirely.
    pub fn base_retry_delay(&self) -> Duration {
        if self.base_retry_delay_secs.is_finite() && self.base_retry_delay_secs > 0.0 {
            Duration::try_from_secs_f64(self.base_retry_delay_secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.effective_max_input_length(), 4000);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_retry_delay(), Duration::from_millis(500));
        assert!((config.effective_temperature() - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.effective_max_output_tokens(), 500);
    }

    #[test]
    fn test_zero_means_unset() {
        let config = ClientConfig {
            timeout_secs: 0,
            max_input_length: 0,
            max_retries: 0,
            base_retry_delay_secs: 0.0,
            temperature: 0.0,
            max_output_tokens: 0,
        };

        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.effective_max_input_length(), DEFAULT_MAX_INPUT_LENGTH);
        assert_eq!(config.effective_max_output_tokens(), DEFAULT_MAX_OUTPUT_TOKENS);
        assert!((config.effective_temperature() - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(config.base_retry_delay(), Duration::ZERO);
    }

    #[test]
    fn test_temperature_is_clamped() {
        let hot = ClientConfig { temperature: 3.5, ..ClientConfig::default() };
        let nan = ClientConfig { temperature: f32::NAN, ..ClientConfig::default() };

        assert!((hot.effective_temperature() - MAX_TEMPERATURE).abs() < f32::EPSILON);
        assert!((nan.effective_temperature() - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bad_retry_delay_is_zero() {
        let negative = ClientConfig { base_retry_delay_secs: -1.0, ..ClientConfig::default() };
        let infinite =
            ClientConfig { base_retry_delay_secs: f64::INFINITY, ..ClientConfig::default() };

        assert_eq!(negative.base_retry_delay(), Duration::ZERO);
        assert_eq!(infinite.base_retry_delay(), Duration::ZERO);
    }
}
