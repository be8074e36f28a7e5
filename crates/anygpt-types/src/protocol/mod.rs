//! Protocol definitions for the chat-completion API.
//!
//! Only the OpenAI ChatCompletions shape is spoken; compatible servers
//! (local gateways, proxies) accept the same body.

pub mod openai;

pub use openai::{
    ApiErrorBody, ChatChoice, ChatMessage, ChatRequest, ChatResponse, ResponseMessage, Role, Usage,
};
