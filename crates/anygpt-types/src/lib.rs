//! # AnyGPT Types
//!
//! Core types, models, and error definitions for AnyGPT.
//!
//! This crate provides the foundational type system for the AnyGPT workspace:
//!
//! - **`error`** - Typed error hierarchy for the client, credentials, and configuration
//! - **`models`** - Per-call client configuration and persisted user settings
//! - **`protocol`** - OpenAI ChatCompletions wire types
//!
//! ## Architecture Role
//!
//! `anygpt-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!      anygpt-types (this crate)
//!              │
//!              ▼
//!        anygpt-client
//!              │
//!              ▼
//!         anygpt-cli
//! ```
//!
//! Nothing in here performs I/O; everything is plain data that can be cloned
//! across async boundaries and compared in tests.

pub mod error;
pub mod models;
pub mod protocol;

// Re-export error types for convenience
pub use error::{ClientError, ConfigError, CredentialError};

// Re-export core model types
pub use models::{ClientConfig, Settings};

pub use protocol::{
    ApiErrorBody, ChatChoice, ChatMessage, ChatRequest, ChatResponse, ResponseMessage, Role, Usage,
};
