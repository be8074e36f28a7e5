//! Configuration models shared by the client and its front ends.

mod client;
mod settings;

pub use client::{
    ClientConfig, DEFAULT_BASE_RETRY_DELAY_SECS, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, MAX_TEMPERATURE,
};
pub use settings::{Settings, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
