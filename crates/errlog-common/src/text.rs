//! Grapheme-aware text measuring and truncation.
//!
//! Lengths are counted in extended grapheme clusters, i.e. what a reader
//! perceives as one character, never in bytes.

use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Number of user-perceived characters in `text`.
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// The first `count` user-perceived characters of `text`.
pub fn take_graphemes(text: &str, count: usize) -> &str {
    match text.grapheme_indices(true).nth(count) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Cut `text` to at most `width` characters, marker included.
///
/// Text that fits is returned unchanged. Otherwise the result is the first
/// `width - marker` characters followed by the marker.
pub fn trim_to_width(text: &str, width: usize, marker: &str) -> String {
    if grapheme_len(text) <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(grapheme_len(marker));
    format!("{}{}", take_graphemes(text, keep), marker)
}
