//! Boundaries between the pipeline and the host environment.
//!
//! The desktop app backs these with the keychain, the pasteboard and the
//! notification center; the CLI and the tests use the adapters in
//! [`crate::adapters`].

use anygpt_types::{ConfigError, CredentialError, Settings};

/// Source of the API key.
pub trait CredentialStore: Send + Sync {
    /// Current key, or `CredentialError::NotFound` when none is stored.
    fn api_key(&self) -> Result<String, CredentialError>;
}

/// Text clipboard.
pub trait ClipboardPort: Send + Sync {
    /// Current text contents; `None` when empty or not text.
    fn read_text(&self) -> Option<String>;
    fn write_text(&self, text: &str);
}

/// Read-only view of the persisted settings.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Result<Settings, ConfigError>;
}

/// User-facing notifications.
pub trait NotificationPort: Send + Sync {
    fn notify(&self, notification: &Notification);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), is_error: false }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), is_error: true }
    }
}
