//! Input text helpers.

/// Cut `text` down to at most `max_chars` Unicode scalar values.
///
/// Returns the kept prefix and whether anything was dropped. Never splits a
/// code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Short form of `text` for log lines: first and last 25 characters.
pub fn preview(text: &str) -> String {
    const EDGE: usize = 25;

    let total = text.chars().count();
    if total == 0 {
        return "<empty>".to_string();
    }
    if total <= EDGE * 2 {
        return text.to_string();
    }

    let head: String = text.chars().take(EDGE).collect();
    let tail: String = text.chars().skip(total - EDGE).collect();
    format!("{head}...{tail} ({total} chars total)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_chars("hello", 10), ("hello", false));
        assert_eq!(truncate_chars("hello", 5), ("hello", false));
        assert_eq!(truncate_chars("", 0), ("", false));
    }

    #[test]
    fn long_text_is_cut_to_exact_length() {
        let text = "a".repeat(4500);

        let (kept, truncated) = truncate_chars(&text, 4000);

        assert!(truncated);
        assert_eq!(kept.chars().count(), 4000);
    }

    #[test]
    fn multibyte_characters_count_once() {
        let (kept, truncated) = truncate_chars("héllo wörld 👋", 7);

        assert!(truncated);
        assert_eq!(kept, "héllo w");

        let (kept, truncated) = truncate_chars("👋👋👋", 2);
        assert!(truncated);
        assert_eq!(kept, "👋👋");
    }

    #[test]
    fn zero_limit_drops_everything() {
        assert_eq!(truncate_chars("abc", 0), ("", true));
    }

    #[test]
    fn preview_keeps_edges() {
        let text = format!("{}{}{}", "a".repeat(25), "b".repeat(50), "c".repeat(25));

        let shown = preview(&text);

        assert_eq!(shown, format!("{}...{} (100 chars total)", "a".repeat(25), "c".repeat(25)));
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(""), "<empty>");
    }
}
