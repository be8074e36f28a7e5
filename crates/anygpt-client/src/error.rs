//! Error types for the text pipeline.

use anygpt_types::{ClientError, CredentialError};
use thiserror::Error;

/// Errors that can end a pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Clipboard was empty or held no text.
    #[error("Nothing to process")]
    NothingToProcess,

    /// No usable API key.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The completion request failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ProcessError {
    /// Check if the run stopped because of `cancel_in_flight`.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Client(ClientError::Cancelled))
    }
}
