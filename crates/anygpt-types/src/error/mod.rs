//! Error types, one enum per domain.
//!
//! Each enum serializes with an adjacent `type`/`details` tag so errors can
//! be logged as structured data, and renders a message fit for the clipboard.

mod client;
mod config;
mod credential;

pub use client::ClientError;
pub use config::ConfigError;
pub use credential::CredentialError;
