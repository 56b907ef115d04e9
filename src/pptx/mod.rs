//! PPTX (PowerPoint) presentation writer.
//!
//! This module serializes a finished [`Document`](crate::Document) as an
//! Office Open XML presentation (.pptx): one slide part per slide element,
//! chart parts with literal data, and embedded picture media.

mod chart;
mod parts;
mod rels;
mod shapes;
mod writer;

pub use parts::{SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};
pub use writer::PptxWriter;

use quick_xml::escape::escape;
use std::borrow::Cow;

/// Escape text content, dropping characters XML 1.0 does not allow.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return escape(text);
    }
    let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    Cow::Owned(escape(cleaned.as_str()).into_owned())
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_drops_illegal_characters() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("Hidden\u{1}signal\u{1b}[0m"), "Hiddensignal[0m");
        assert_eq!(escape_text("tab\tok\u{FFFF}"), "tab\tok");
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }
}
