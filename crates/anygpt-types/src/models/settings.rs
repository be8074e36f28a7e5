//! Persisted user settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::client::{
    ClientConfig, DEFAULT_BASE_RETRY_DELAY_SECS, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// User preferences, as edited in the preferences pane.
///
/// Every field is optional in the stored JSON and falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct Settings {
    /// Model identifier sent with every request
    pub model: String,
    /// System message placed before the user text
    pub system_prompt: String,
    /// Sampling temperature; 0 means "use the default"
    #[validate(range(min = 0.0_f32, max = 2.0_f32))]
    pub temperature: f32,
    /// Maximum output tokens; 0 means "use the default"
    pub max_tokens: u32,
    /// Per-attempt timeout in seconds
    #[validate(range(max = 600_u64))]
    pub timeout_secs: u64,
    /// Input truncation limit in characters
    pub max_input_length: usize,
    /// Extra attempts for transient failures
    #[validate(range(max = 10_u32))]
    pub max_retries: u32,
    /// Base delay of the exponential backoff in seconds
    #[validate(range(min = 0.0_f64, max = 60.0_f64))]
    pub base_retry_delay_secs: f64,
    /// Paste the result into the frontmost app after copying it
    pub auto_paste: bool,
    /// Play a sound when a result is ready
    pub play_sound: bool,
    /// Chat-completions URL override for compatible servers
    pub endpoint: Option<String>,
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
            base_retry_delay_secs: DEFAULT_BASE_RETRY_DELAY_SECS,
            auto_paste: false,
            play_sound: false,
            endpoint: None,
        }
    }

    /// Model to request; blank values fall back to the default.
    pub fn effective_model(&self) -> &str {
        if self.model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            &self.model
        }
    }

    /// System prompt to send; blank values fall back to the default.
    pub fn effective_system_prompt(&self) -> &str {
        if self.system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT
        } else {
            &self.system_prompt
        }
    }

    /// Project the request-related settings onto a [`ClientConfig`].
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout_secs: self.timeout_secs,
            max_input_length: self.max_input_length,
            max_retries: self.max_retries,
            base_retry_delay_secs: self.base_retry_delay_secs,
            temperature: self.temperature,
            max_output_tokens: self.max_tokens,
        }
    }

    /// Run field validation and report the first offending field.
    pub fn check(&self) -> Result<(), ConfigError> {
        Validate::validate(self).map_err(|errors| {
            let mut fields: Vec<String> =
                errors.field_errors().keys().map(|k| k.to_string()).collect();
            fields.sort();
            let field = fields.into_iter().next().unwrap_or_default();
            ConfigError::invalid(&field, errors.to_string())
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
