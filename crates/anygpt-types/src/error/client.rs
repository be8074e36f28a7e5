//! Chat-completion client errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while generating a completion.
///
/// Every variant renders a message that can be shown to the user as-is
/// (the pipeline copies it into the clipboard on failure).
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ClientError {
    /// Endpoint URL is malformed or the request could not be built
    #[error("Invalid API URL: {0}")]
    InvalidEndpoint(String),

    /// Response body was empty or not text
    #[error("No data received from API")]
    NoData,

    /// Response body was present but had an unusable shape
    #[error("Failed to decode response: {0}")]
    Decoding(String),

    /// Remote explicitly reported an error (error body or 4xx)
    #[error("API Error: {0}")]
    Api(String),

    /// Remote answered 429 Too Many Requests
    #[error("Rate limited. Please try again later.")]
    RateLimited,

    /// Transport failure or unusable status code
    #[error("Network Error: {detail}")]
    Network {
        /// Human-readable failure description
        detail: String,
        /// Whether re-sending the same request may succeed
        transient: bool,
    },

    /// A single attempt exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// The call was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Transport-level or 5xx failure; worth retrying.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network { detail: detail.into(), transient: true }
    }

    /// Status code the client does not know how to handle; never retried.
    pub fn unexpected_status(status: u16) -> Self {
        Self::Network { detail: format!("unexpected status: {status}"), transient: false }
    }

    /// 5xx response from the endpoint.
    pub fn server_error(status: u16) -> Self {
        Self::network(format!("server error: {status}"))
    }

    /// Check if re-attempting the same request after a delay may succeed.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Timeout => true,
            Self::Network { transient, .. } => *transient,
            Self::InvalidEndpoint(_)
            | Self::NoData
            | Self::Decoding(_)
            | Self::Api(_)
            | Self::Cancelled => false,
        }
    }

    /// Check if the call ended because of `cancel_in_flight`.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
