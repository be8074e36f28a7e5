//! OpenAI ChatCompletions API types.

use serde::{Deserialize, Deserializer, Serialize};

/// OpenAI message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Request body for the chat completions endpoint.
///
/// Always holds exactly one system message followed by exactly one user
/// message; the only way to build one is [`ChatRequest::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_text: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage { role: Role::System, content: system_prompt.into() },
                ChatMessage { role: Role::User, content: user_text.into() },
            ],
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }
}

/// Response from the chat completions endpoint.
///
/// Every field is optional on the wire; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    /// Unique response identifier.
    pub id: Option<String>,
    /// Object kind ("chat.completion").
    pub object: Option<String>,
    /// Unix timestamp of creation.
    pub created: Option<i64>,
    /// Model that generated the response.
    pub model: Option<String>,
    /// Generated completion choices.
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<ChatChoice>,
    /// Token usage statistics.
    pub usage: Option<Usage>,
    /// Error reported by the API, occasionally sent with a 2xx status.
    pub error: Option<ApiErrorBody>,
}

impl ChatResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Content of the first choice, if the API returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.as_ref()?.content.as_deref()
    }

    /// Finish reason of the first choice.
    pub fn first_finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }
}

/// A single completion choice in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Index of this choice in the list.
    #[serde(default)]
    pub index: u32,
    /// Generated message.
    pub message: Option<ResponseMessage>,
    /// Reason generation stopped ("stop", "length", etc.).
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub role: Option<String>,
    /// `null` when the model answered with tool calls only.
    pub content: Option<String>,
}

/// Token usage statistics for a request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Error object returned by the API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// OpenAI sends a string here; some compatible servers send the HTTP status number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: Option<String>,
}

impl ApiErrorBody {
    /// Extract `error.message` from a raw body, if it has the expected shape.
    pub fn message_from_slice(bytes: &[u8]) -> Option<String> {
        ChatResponse::from_slice(bytes).ok()?.error.map(|e| e.message)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello! How can I help you today?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
        }"#;

        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();

        assert_eq!(response.first_content(), Some("Hello! How can I help you today?"));
        assert_eq!(response.first_finish_reason(), Some("stop"));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(18));
        assert_eq!(response.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(response.created, Some(1677652288));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": {
                "message": "Invalid API key provided",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        }"#;

        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();
        let error = response.error.unwrap();

        assert_eq!(error.message, "Invalid API key provided");
        assert_eq!(error.kind.as_deref(), Some("invalid_request_error"));
        assert_eq!(error.code.as_deref(), Some("invalid_api_key"));
        assert!(response.choices.is_empty());
    }

    #[test]
    fn test_numeric_error_code() {
        let json = r#"{"error": {"message": "Resource exhausted", "code": 429}}"#;

        let message = ApiErrorBody::message_from_slice(json.as_bytes());
        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();

        assert_eq!(message.as_deref(), Some("Resource exhausted"));
        assert_eq!(response.error.unwrap().code.as_deref(), Some("429"));
    }

    #[test]
    fn test_parse_multiple_choices() {
        let json = r#"{
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "First response"}},
                {"index": 1, "message": {"role": "assistant", "content": "Second response"}}
            ]
        }"#;

        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();

        assert_eq!(response.choices.len(), 2);
        assert_eq!(response.first_content(), Some("First response"));
        assert_eq!(response.choices[1].index, 1);
    }

    #[test]
    fn test_empty_and_missing_choices() {
        let empty = ChatResponse::from_slice(br#"{"choices": []}"#).unwrap();
        let partial =
            ChatResponse::from_slice(br#"{"id": "test", "object": "chat.completion"}"#).unwrap();
        let null = ChatResponse::from_slice(br#"{"choices": null}"#).unwrap();

        assert!(empty.first_content().is_none());
        assert!(partial.choices.is_empty());
        assert!(partial.usage.is_none());
        assert!(null.choices.is_empty());
    }

    #[test]
    fn test_null_content_is_not_extractable() {
        let json = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}"#;

        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();

        assert!(response.first_content().is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{
            "system_fingerprint": "fp_44709d6fcb",
            "service_tier": "default",
            "choices": [{
                "index": 0,
                "logprobs": null,
                "message": {"role": "assistant", "content": "ok", "refusal": null}
            }]
        }"#;

        let response = ChatResponse::from_slice(json.as_bytes()).unwrap();

        assert_eq!(response.first_content(), Some("ok"));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(ChatResponse::from_slice(b"This is not valid JSON").is_err());
    }

    #[test]
    fn test_request_round_trip() {
        let request = ChatRequest::new("gpt-4o-mini", "You are helpful.", "Hello")
            .with_temperature(0.7)
            .with_max_tokens(100);

        let json = serde_json::to_string(&request).unwrap();
        let decoded: ChatRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, request);
        assert_eq!(decoded.messages().len(), 2);
        assert_eq!(decoded.messages()[0].role, Role::System);
        assert_eq!(decoded.messages()[1], ChatMessage { role: Role::User, content: "Hello".to_string() });
        assert_eq!(decoded.temperature(), Some(0.7));
        assert_eq!(decoded.max_tokens(), Some(100));
    }

    #[test]
    fn test_request_wire_field_names() {
        let request = ChatRequest::new("gpt-4o-mini", "sys", "hi").with_max_tokens(500);

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 500);
        assert!(value.get("temperature").is_none());
    }
}
