//! Normalization of generated text.
//!
//! Language models decorate answers with markdown and quotes even when asked
//! not to. This module strips that decoration before the text reaches the
//! content parser.

use unicode_normalization::UnicodeNormalization;

/// Clean a text response from the generation service.
///
/// Applies NFC normalization, replaces control characters other than line
/// breaks with spaces, removes markdown emphasis, heading and list markers
/// line by line, and trims quotes surrounding a single-line answer.
pub fn clean_generated_text(text: &str) -> String {
    let normalized = normalize_unicode(text);

    let lines: Vec<String> = normalized
        .lines()
        .map(|line| strip_line_markers(line.trim()))
        .collect();

    let mut result = lines.join("\n").trim().to_string();

    if !result.contains('\n') {
        result = trim_quotes(&result).to_string();
    }

    result
}

/// NFC normalization plus the handful of substitutions models commonly emit.
fn normalize_unicode(text: &str) -> String {
    let normalized: String = text.nfc().collect();

    normalized
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        // Non-breaking and narrow spaces
        .replace(['\u{00A0}', '\u{2009}', '\u{202F}'], " ")
        // Zero-width characters
        .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
        .chars()
        .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
        .collect()
}

/// Remove leading heading/list markers and inline emphasis from one line.
fn strip_line_markers(line: &str) -> String {
    let mut rest = line;

    if rest.starts_with('#') {
        rest = rest.trim_start_matches('#').trim_start();
    }

    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(stripped) = rest.strip_prefix(marker) {
            rest = stripped.trim_start();
            break;
        }
    }

    rest.replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .replace('*', "")
        .trim()
        .to_string()
}

fn trim_quotes(text: &str) -> &str {
    let pairs = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}'), ('\u{2018}', '\u{2019}')];
    for (open, close) in pairs {
        if text.chars().count() >= 2 && text.starts_with(open) && text.ends_with(close) {
            let inner = &text[open.len_utf8()..text.len() - close.len_utf8()];
            return inner.trim();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_quotes_on_single_line() {
        assert_eq!(clean_generated_text("\"The Hollow Moon\""), "The Hollow Moon");
        assert_eq!(
            clean_generated_text("\u{201C}Birds Aren't Real\u{201D}"),
            "Birds Aren't Real"
        );
        assert_eq!(clean_generated_text("'x'"), "x");
    }

    #[test]
    fn test_keeps_inner_quotes_on_multi_line() {
        let cleaned = clean_generated_text("\"first\nsecond\"");
        assert_eq!(cleaned, "\"first\nsecond\"");
    }

    #[test]
    fn test_strips_markdown_markers() {
        let cleaned = clean_generated_text("## **Heading**\n- one\n* two\n• three\n`code`");
        assert_eq!(cleaned, "Heading\none\ntwo\nthree\ncode");
    }

    #[test]
    fn test_keeps_chart_lines_intact() {
        let cleaned = clean_generated_text("A, B, C\r\n1, 2.5, 3\r\n");
        assert_eq!(cleaned, "A, B, C\n1, 2.5, 3");
    }

    #[test]
    fn test_normalizes_unicode() {
        // "e" followed by a combining acute accent
        let cleaned = clean_generated_text("Cafe\u{0301}\u{00A0}secrets\u{200B}");
        assert_eq!(cleaned, "Caf\u{00E9} secrets");
    }

    #[test]
    fn test_replaces_control_characters() {
        assert_eq!(
            clean_generated_text("Hidden\u{1}signal\u{1b}[0m"),
            "Hidden signal [0m"
        );
        assert_eq!(clean_generated_text("a\tb\u{7f}\nc\u{0}"), "a b\nc");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(clean_generated_text(""), "");
        assert_eq!(clean_generated_text("  \n\n "), "");
        assert_eq!(clean_generated_text("\""), "\"");
    }
}
