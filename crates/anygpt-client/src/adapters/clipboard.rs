use parking_lot::Mutex;

use crate::ports::ClipboardPort;

/// Clipboard kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { contents: Mutex::new(Some(text.into())) }
    }

    /// Raw contents, including an empty string.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl ClipboardPort for MemoryClipboard {
    fn read_text(&self) -> Option<String> {
        self.contents.lock().clone().filter(|text| !text.is_empty())
    }

    fn write_text(&self, text: &str) {
        *self.contents.lock() = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_reads_as_nothing() {
        let clipboard = MemoryClipboard::with_text("");

        assert_eq!(clipboard.read_text(), None);

        clipboard.write_text("copied");
        assert_eq!(clipboard.read_text().as_deref(), Some("copied"));
    }
}
