use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anygpt_types::{ApiErrorBody, ChatRequest, ChatResponse, ClientConfig, ClientError, Usage};
use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::retry::{RetryPolicy, RetryState};
use crate::text::truncate_chars;

/// Public OpenAI chat completions endpoint.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const PROBE_TEXT: &str = "Hi";
const PROBE_MODEL: &str = "gpt-3.5-turbo";
const PROBE_SYSTEM_PROMPT: &str = "You are a test.";
const PROBE_MAX_TOKENS: u32 = 5;

/// Result of a successful `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Extracted completion text, or the raw body when `degraded`.
    pub text: String,
    /// Input was cut down to `max_input_length` characters.
    pub truncated: bool,
    /// Success status, but no content could be extracted; `text` is the raw body.
    pub degraded: bool,
    /// Why the body could not be used as-is (always a `ClientError::Decoding`).
    pub fallback_reason: Option<ClientError>,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

/// Payload of a single successful attempt.
#[derive(Debug)]
struct Reply {
    text: String,
    fallback_reason: Option<ClientError>,
    model: Option<String>,
    usage: Option<Usage>,
    finish_reason: Option<String>,
}

impl Reply {
    fn raw(body: &str, reason: String) -> Self {
        Self {
            text: body.to_string(),
            fallback_reason: Some(ClientError::Decoding(reason)),
            model: None,
            usage: None,
            finish_reason: None,
        }
    }
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    token: CancellationToken,
}

/// Chat-completion client.
///
/// Build one at startup and share it: clones reuse the same connection pool
/// and the same in-flight registry, so `cancel_in_flight` on any clone reaches
/// calls started from the others. Concurrent calls are otherwise independent.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    endpoint: Url,
    in_flight: Arc<Mutex<Vec<InFlight>>>,
    next_call_id: Arc<AtomicU64>,
}

impl LlmClient {
    /// Client for the public OpenAI endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_endpoint(OPENAI_CHAT_COMPLETIONS_URL)
    }

    /// Client for any OpenAI-compatible chat completions URL.
    pub fn with_endpoint(endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build().map_err(|e| {
            ClientError::Network {
                detail: format!("failed to build HTTP client: {e}"),
                transient: false,
            }
        })?;
        Ok(Self {
            http,
            endpoint,
            in_flight: Arc::new(Mutex::new(Vec::new())),
            next_call_id: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send `text` to the model and return the completion.
    ///
    /// Contract:
    /// - Input is truncated to `config.max_input_length` characters; see [`Generation::truncated`].
    /// - Retryable failures (429, 5xx, transport, timeout) are retried up to
    ///   `config.max_retries` times with exponential backoff.
    /// - A success status with an unusable body yields the raw body with
    ///   [`Generation::degraded`] set instead of an error.
    pub async fn generate(
        &self,
        text: &str,
        credential: &str,
        model: &str,
        system_prompt: &str,
        config: &ClientConfig,
    ) -> Result<Generation, ClientError> {
        let (input, truncated) = truncate_chars(text, config.effective_max_input_length());
        let request = ChatRequest::new(model, system_prompt, input)
            .with_temperature(config.effective_temperature())
            .with_max_tokens(config.effective_max_output_tokens());

        let call = self.register_call();
        let (reply, attempts) =
            self.execute_with_retry(&request, credential, config, &call.token).await?;

        Ok(Generation {
            text: reply.text,
            truncated,
            degraded: reply.fallback_reason.is_some(),
            fallback_reason: reply.fallback_reason,
            attempts,
            model: reply.model,
            usage: reply.usage,
            finish_reason: reply.finish_reason,
        })
    }

    /// Check a credential with a tiny probe request.
    ///
    /// Goes through [`Self::generate`], so retry and classification rules are
    /// the same. Callers usually read `ClientError::Api` as "invalid key".
    pub async fn validate_credential(&self, credential: &str) -> Result<bool, ClientError> {
        let config = ClientConfig { max_output_tokens: PROBE_MAX_TOKENS, ..ClientConfig::default() };
        match self.generate(PROBE_TEXT, credential, PROBE_MODEL, PROBE_SYSTEM_PROMPT, &config).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!("API key validation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Cancel the most recently started call that is still running.
    ///
    /// No-op when nothing is in flight. The cancelled call stops at its next
    /// suspension point (request or retry delay) and resolves to
    /// `ClientError::Cancelled`.
    pub fn cancel_in_flight(&self) {
        let cancelled = self.in_flight.lock().pop();
        if let Some(call) = cancelled {
            debug!(call_id = call.id, "Cancelling in-flight request");
            call.token.cancel();
        }
    }

    /// Whether any call on this client (or its clones) is still running.
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.lock().is_empty()
    }

    fn register_call(&self) -> CallGuard<'_> {
        let id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.in_flight.lock().push(InFlight { id, token: token.clone() });
        CallGuard { registry: &self.in_flight, id, token }
    }

    async fn execute_with_retry(
        &self,
        request: &ChatRequest,
        credential: &str,
        config: &ClientConfig,
        cancel: &CancellationToken,
    ) -> Result<(Reply, u32), ClientError> {
        let policy = RetryPolicy::from_config(config);
        let timeout = config.timeout();
        let mut state = RetryState::Attempting { attempt: 1 };
        let mut last: Option<(Result<Reply, ClientError>, u32)> = None;

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    debug!(
                        "Sending chat completion request (attempt {}/{})",
                        attempt,
                        policy.max_attempts()
                    );
                    let outcome = tokio::select! {
                        biased;
                        () = cancel.cancelled() => Err(ClientError::Cancelled),
                        outcome = self.send_once(request, credential, timeout) => outcome,
                    };
                    let next = policy.after_attempt(attempt, outcome.as_ref().err());
                    last = Some((outcome, attempt));
                    next
                }
                RetryState::WaitingToRetry { next_attempt, delay } => {
                    if let Some((Err(e), _)) = &last {
                        warn!(
                            "{}, retrying after {:?} (attempt {}/{})",
                            e,
                            delay,
                            next_attempt,
                            policy.max_attempts()
                        );
                    }
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ClientError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                    RetryState::Attempting { attempt: next_attempt }
                }
                RetryState::Succeeded | RetryState::Failed => break,
            };
        }

        match last {
            Some((outcome, attempts)) => outcome.map(|reply| (reply, attempts)),
            None => Err(ClientError::network("no attempt was made")),
        }
    }

    async fn send_once(
        &self,
        request: &ChatRequest,
        credential: &str,
        timeout: Duration,
    ) -> Result<Reply, ClientError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = resp.status().as_u16();
        debug!("Received response with status code: {}", status);

        let body = resp.bytes().await.map_err(classify_transport_error)?;
        classify_response(status, &body)
    }
}

/// Removes a call from the in-flight registry when it ends, however it ends.
struct CallGuard<'a> {
    registry: &'a Mutex<Vec<InFlight>>,
    id: u64,
    token: CancellationToken,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().retain(|call| call.id != self.id);
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| ClientError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        scheme => Err(ClientError::InvalidEndpoint(format!(
            "{endpoint}: unsupported scheme or missing host ({scheme})"
        ))),
    }
}

fn classify_transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_builder() {
        ClientError::InvalidEndpoint(e.to_string())
    } else {
        ClientError::network(e.to_string())
    }
}

/// Map a status code and raw body onto a reply or a classified error.
fn classify_response(status: u16, body: &[u8]) -> Result<Reply, ClientError> {
    match status {
        200..=299 => parse_success_body(body),
        429 => Err(ClientError::RateLimited),
        400..=499 => Err(ClientError::Api(error_message(status, body))),
        500..=599 => Err(ClientError::server_error(status)),
        _ => Err(ClientError::unexpected_status(status)),
    }
}

fn parse_success_body(body: &[u8]) -> Result<Reply, ClientError> {
    let raw = match std::str::from_utf8(body) {
        Ok(text) if !text.is_empty() => text,
        _ => return Err(ClientError::NoData),
    };

    let response = match ChatResponse::from_slice(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Decoding error, returning raw response: {}", e);
            return Ok(Reply::raw(raw, e.to_string()));
        }
    };

    if let Some(error) = &response.error {
        return Err(ClientError::Api(error.message.clone()));
    }

    let Some(content) = response.first_content() else {
        warn!("Could not extract content, returning raw JSON");
        return Ok(Reply::raw(raw, "no message content in first choice".to_string()));
    };

    if let Some(usage) = response.usage {
        info!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(Reply {
        text: content.to_string(),
        fallback_reason: None,
        finish_reason: response.first_finish_reason().map(str::to_string),
        model: response.model,
        usage: response.usage,
    })
}

fn error_message(status: u16, body: &[u8]) -> String {
    ApiErrorBody::message_from_slice(body)
        .or_else(|| {
            std::str::from_utf8(body)
                .ok()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Unknown error (status {status})"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn success_body_yields_first_choice() {
        let body = br#"{"model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"Hello"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#;

        let reply = classify_response(200, body).unwrap();

        assert_eq!(reply.text, "Hello");
        assert!(reply.fallback_reason.is_none());
        assert_eq!(reply.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
        assert_eq!(reply.usage.map(|u| u.total_tokens), Some(4));
    }

    #[test]
    fn empty_content_string_is_still_content() {
        let body = br#"{"choices":[{"index":0,"message":{"role":"assistant","content":""}}]}"#;

        let reply = classify_response(200, body).unwrap();

        assert_eq!(reply.text, "");
        assert!(reply.fallback_reason.is_none());
    }

    #[test]
    fn empty_choices_fall_back_to_raw_body() {
        let body = br#"{"choices":[]}"#;

        let reply = classify_response(200, body).unwrap();

        assert_eq!(reply.text, r#"{"choices":[]}"#);
        assert!(matches!(reply.fallback_reason, Some(ClientError::Decoding(_))));
    }

    #[test]
    fn non_json_success_body_falls_back_to_raw_text() {
        let reply = classify_response(200, b"plain text answer").unwrap();

        assert_eq!(reply.text, "plain text answer");
        assert!(reply.fallback_reason.is_some());
    }

    #[test]
    fn error_object_with_success_status_is_api_error() {
        let body = br#"{"error":{"message":"Invalid API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;

        let err = classify_response(200, body).unwrap_err();

        assert_eq!(err, ClientError::Api("Invalid API key provided".to_string()));
    }

    #[test]
    fn empty_or_binary_success_body_is_no_data() {
        assert_eq!(classify_response(200, b"").unwrap_err(), ClientError::NoData);
        assert_eq!(classify_response(200, &[0xff, 0xfe, 0x00]).unwrap_err(), ClientError::NoData);
    }

    #[test]
    fn whitespace_success_body_is_returned_raw() {
        let reply = classify_response(200, b"  \n").unwrap();

        assert_eq!(reply.text, "  \n");
        assert!(matches!(reply.fallback_reason, Some(ClientError::Decoding(_))));
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_response(429, b"{}").unwrap_err(), ClientError::RateLimited);
        assert_eq!(classify_response(500, b"oops").unwrap_err(), ClientError::server_error(500));
        assert_eq!(classify_response(503, b"").unwrap_err(), ClientError::server_error(503));
        assert_eq!(classify_response(304, b"").unwrap_err(), ClientError::unexpected_status(304));
        assert_eq!(classify_response(102, b"").unwrap_err(), ClientError::unexpected_status(102));
    }

    #[test]
    fn client_error_prefers_api_message() {
        let body = br#"{"error":{"message":"Unsupported parameter: 'max_tokens'","type":"invalid_request_error"}}"#;

        assert_eq!(
            classify_response(400, body).unwrap_err(),
            ClientError::Api("Unsupported parameter: 'max_tokens'".to_string())
        );
    }

    #[test]
    fn client_error_falls_back_to_raw_body() {
        assert_eq!(
            classify_response(404, b"  Not Found\n").unwrap_err(),
            ClientError::Api("Not Found".to_string())
        );
        assert_eq!(
            classify_response(401, b"").unwrap_err(),
            ClientError::Api("Unknown error (status 401)".to_string())
        );
    }

    #[test]
    fn endpoint_validation() {
        assert!(parse_endpoint("https://api.openai.com/v1/chat/completions").is_ok());
        assert!(parse_endpoint("http://127.0.0.1:8045/v1/chat/completions").is_ok());

        assert!(matches!(parse_endpoint("not a url"), Err(ClientError::InvalidEndpoint(_))));
        assert!(matches!(parse_endpoint("ftp://example.com/x"), Err(ClientError::InvalidEndpoint(_))));
        assert!(matches!(parse_endpoint("mailto:someone@example.com"), Err(ClientError::InvalidEndpoint(_))));
    }

    #[test]
    fn cancel_without_calls_is_a_no_op() {
        let client = LlmClient::new().expect("default endpoint is valid");

        client.cancel_in_flight();
        client.cancel_in_flight();

        assert!(!client.has_in_flight());
    }

    #[test]
    fn registry_tracks_calls_until_dropped() {
        let client = LlmClient::new().expect("default endpoint is valid");

        let first = client.register_call();
        let second = client.register_call();
        assert!(client.has_in_flight());

        client.cancel_in_flight();
        assert!(second.token.is_cancelled());
        assert!(!first.token.is_cancelled());

        client.cancel_in_flight();
        assert!(first.token.is_cancelled());

        drop(first);
        drop(second);
        assert!(!client.has_in_flight());
    }
}
