//! Clipboard in, completion out.
//!
//! One run reads the clipboard, sends it through [`LlmClient::generate`] and
//! writes either the completion or an `Error: ...` line back, so the user
//! always finds something useful to paste.

use std::sync::Arc;

use anygpt_types::Settings;
use tracing::{info, warn};

use crate::client::LlmClient;
use crate::error::ProcessError;
use crate::ports::{ClipboardPort, CredentialStore, Notification, NotificationPort, SettingsSource};
use crate::text::preview;

/// Input used by the "test" action.
pub const SAMPLE_TEXT: &str = "This is a sample text for testing AnyGPT functionality.";

const APP_TITLE: &str = "AnyGPT";
const SELECT_TEXT_HINT: &str = "Please select text first";

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub input_chars: usize,
    pub output_chars: usize,
    pub truncated: bool,
    pub degraded: bool,
    /// The front end should paste the result into the focused app.
    pub paste: bool,
    /// The front end should play the completion sound.
    pub play_sound: bool,
}

/// Runs the clipboard pipeline against a set of ports.
#[derive(Clone)]
pub struct TextProcessor {
    client: LlmClient,
    credentials: Arc<dyn CredentialStore>,
    clipboard: Arc<dyn ClipboardPort>,
    settings: Arc<dyn SettingsSource>,
    notifier: Arc<dyn NotificationPort>,
}

impl TextProcessor {
    pub fn new(
        client: LlmClient,
        credentials: Arc<dyn CredentialStore>,
        clipboard: Arc<dyn ClipboardPort>,
        settings: Arc<dyn SettingsSource>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self { client, credentials, clipboard, settings, notifier }
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// Process whatever text is on the clipboard.
    pub async fn process_clipboard(&self) -> Result<Processed, ProcessError> {
        let Some(text) = self.clipboard.read_text() else {
            warn!("Clipboard is empty, nothing to process");
            self.notifier.notify(&Notification::error(APP_TITLE, "Nothing to process"));
            self.clipboard.write_text(SELECT_TEXT_HINT);
            return Err(ProcessError::NothingToProcess);
        };
        self.run(&text, false).await
    }

    /// Process [`SAMPLE_TEXT`]. Never asks for a paste.
    pub async fn process_sample(&self) -> Result<Processed, ProcessError> {
        self.run(SAMPLE_TEXT, true).await
    }

    /// Stop the run currently waiting on the API, if any.
    pub fn cancel(&self) {
        self.client.cancel_in_flight();
    }

    async fn run(&self, text: &str, is_test: bool) -> Result<Processed, ProcessError> {
        info!("Processing text: {}", preview(text));
        let settings = self.load_settings();

        let credential = match self.credentials.api_key() {
            Ok(key) => key,
            Err(e) => {
                warn!("No usable API key: {}", e);
                self.notifier.notify(&Notification::error(APP_TITLE, "API key not configured"));
                return Err(e.into());
            }
        };

        let config = settings.client_config();
        let result = self
            .client
            .generate(
                text,
                &credential,
                settings.effective_model(),
                settings.effective_system_prompt(),
                &config,
            )
            .await;

        match result {
            Ok(generation) => {
                if generation.truncated {
                    warn!(
                        "Input truncated from {} to {} characters",
                        text.chars().count(),
                        config.effective_max_input_length()
                    );
                }

                let processed = Processed {
                    input_chars: text.chars().count(),
                    output_chars: generation.text.chars().count(),
                    truncated: generation.truncated,
                    degraded: generation.degraded,
                    paste: settings.auto_paste && !is_test,
                    play_sound: settings.play_sound,
                };

                self.clipboard.write_text(&generation.text);
                let mut summary =
                    format!("In: {} chars • Out: {} chars", processed.input_chars, processed.output_chars);
                if processed.degraded {
                    summary.push_str(" (raw response)");
                }
                self.notifier.notify(&Notification::info(APP_TITLE, summary));
                info!(
                    attempts = generation.attempts,
                    "Text processed: {} -> {} chars", processed.input_chars, processed.output_chars
                );
                Ok(processed)
            }
            Err(e) if e.is_cancelled() => {
                info!("Processing cancelled");
                Err(e.into())
            }
            Err(e) => {
                warn!("Processing failed: {}", e);
                self.clipboard.write_text(&format!("Error: {e}"));
                self.notifier.notify(&Notification::error(APP_TITLE, "Error copied to clipboard"));
                Err(e.into())
            }
        }
    }

    fn load_settings(&self) -> Settings {
        self.settings.load().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        })
    }
}
