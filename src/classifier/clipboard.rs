// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clipboard content classification (spec §4.4).

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid static pattern"));
#[allow(clippy::expect_used)]
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid static pattern")
});
#[allow(clippy::expect_used)]
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\-+()]{7,20}$").expect("valid static pattern"));

const CODE_KEYWORDS: &[&str] = &[
    "function ", "const ", "let ", "def ", "class ", "import ", "fn ", "=>", "{\n", "};", "</",
];

/// Classify one clipboard text payload into its trigger name.
pub fn classify_clipboard_text(text: &str) -> &'static str {
    let trimmed = text.trim();
    if trimmed.len() >= 500 {
        return "clipboard_long";
    }
    if URL_RE.is_match(trimmed) {
        return "clipboard_url";
    }
    if EMAIL_RE.is_match(trimmed) {
        return "clipboard_email";
    }
    if PHONE_RE.is_match(trimmed) && trimmed.chars().any(|c| c.is_ascii_digit()) {
        return "clipboard_phone";
    }
    if CODE_KEYWORDS.iter().any(|kw| trimmed.contains(kw)) {
        return "clipboard_code";
    }
    "clipboard_copy"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_url() {
        assert_eq!(classify_clipboard_text("https://example.com/path"), "clipboard_url");
    }

    #[test]
    fn classifies_email() {
        assert_eq!(classify_clipboard_text("person@example.com"), "clipboard_email");
    }

    #[test]
    fn classifies_phone() {
        assert_eq!(classify_clipboard_text("+1 (555) 123-4567"), "clipboard_phone");
    }

    #[test]
    fn classifies_code() {
        assert_eq!(classify_clipboard_text("function foo() { return 1; }"), "clipboard_code");
    }

    #[test]
    fn classifies_long_text_regardless_of_content() {
        let text = "a".repeat(600);
        assert_eq!(classify_clipboard_text(&text), "clipboard_long");
    }

    #[test]
    fn falls_back_to_generic_copy() {
        assert_eq!(classify_clipboard_text("just some plain words"), "clipboard_copy");
    }
}
