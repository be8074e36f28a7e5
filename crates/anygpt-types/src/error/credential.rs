//! Credential store errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a credential store.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum CredentialError {
    /// No API key has been stored yet
    #[error("No API key found")]
    NotFound,

    /// Backing store failed (permissions, unreadable entry, etc)
    #[error("Credential storage error: {message}")]
    StorageError {
        /// Description of the storage failure
        message: String,
    },
}

impl CredentialError {
    /// Check if the store simply has nothing configured.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
