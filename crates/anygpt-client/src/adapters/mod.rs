//! In-process implementations of the pipeline ports.

mod clipboard;
mod credentials;
mod notifier;
mod settings_file;

pub use clipboard::MemoryClipboard;
pub use credentials::{EnvCredentialStore, StaticCredentialStore, API_KEY_ENV_VARS};
pub use notifier::{MemoryNotifier, TracingNotifier};
pub use settings_file::{config_dir, JsonSettingsFile, StaticSettings};
