//! Invisible-character cleanup.

use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::fixed;

/// Zero-width space/non-joiner/joiner and the byte-order mark, in literal
/// form and in every common entity spelling (decimal, hex, named).
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    fixed(
        r"(?i)[\u{200B}\u{200C}\u{200D}\u{FEFF}]|&#0*(?:8203|8204|8205|65279);|&#x0*(?:200b|200c|200d|feff);|&(?:ZeroWidthSpace|zwnj|zwj);",
    )
});

/// Removes zero-width characters and byte-order marks from the markup.
///
/// Senders hide these in words to defeat spam filtering and to split
/// keywords; they also break text selection and screen readers. Cosmetic
/// cleanup, applied on every render regardless of settings.
#[must_use]
pub fn strip_invisible_characters(html: &str) -> String {
    INVISIBLE.replace_all(html, "").into_owned()
}
