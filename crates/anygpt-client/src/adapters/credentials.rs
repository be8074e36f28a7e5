use anygpt_types::CredentialError;

use crate::ports::CredentialStore;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["ANYGPT_API_KEY", "OPENAI_API_KEY"];

/// Reads the API key from the environment. Blank values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn api_key(&self) -> Result<String, CredentialError> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or(CredentialError::NotFound)
    }
}

/// Fixed key, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore(Option<String>);

impl StaticCredentialStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl CredentialStore for StaticCredentialStore {
    fn api_key(&self) -> Result<String, CredentialError> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or(CredentialError::NotFound)
    }
}
