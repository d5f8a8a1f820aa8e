//! Shared regex construction for the transform modules.

use regex::Regex;

/// Compiles a fixed pattern.
///
/// Every pattern in this crate is a string literal exercised by the test
/// suite, so compilation cannot fail at runtime.
#[allow(clippy::unwrap_used)]
pub(crate) fn fixed(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}
