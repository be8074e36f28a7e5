#![doc = include_str!("../README.md")]

pub mod adapters;
mod client;
mod error;
pub mod pipeline;
pub mod ports;
pub mod retry;
pub mod text;

pub use client::{Generation, LlmClient, OPENAI_CHAT_COMPLETIONS_URL};
pub use error::ProcessError;
pub use pipeline::{Processed, TextProcessor, SAMPLE_TEXT};

pub use anygpt_types::{ClientConfig, ClientError, CredentialError, Settings, Usage};
