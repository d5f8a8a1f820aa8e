//! Privacy transform stages.
//!
//! Independent, composable `&str -> String` transforms applied to sanitized
//! HTML, in this order:
//!
//! 1. [`strip_invisible_characters`] - always on
//! 2. [`strip_tracking_pixels`] - always on
//! 3. [`inject_lazy_loading`] - always on
//! 4. [`block_remote_images`] - gated by `block_remote_images`
//! 5. [`strip_tracking_parameters`] - gated by `strip_tracking_parameters`
//!
//! Each stage allocates a new string; the input is never mutated in place.

mod images;
mod invisible;
mod links;
mod pixels;

pub use images::{BLOCKED_IMAGE_PLACEHOLDER, block_remote_images, inject_lazy_loading};
pub use invisible::strip_invisible_characters;
pub use links::{TRACKING_PARAMETERS, strip_tracking_parameters};
pub use pixels::strip_tracking_pixels;

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::fixed;

/// Any `<img>` tag, self-closing or not.
pub(crate) static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?is)<img\b[^>]*/?>"));

/// Locates an attribute inside a single tag's source text.
///
/// Returns the span of the whole attribute (including the leading whitespace
/// run, so removal leaves the tag well formed) and the span of its value.
/// For a bare attribute (`<img ismap>`) the value span is empty. `name` must
/// be lowercase ASCII; matching against the tag is case-insensitive.
pub(crate) fn attr_span(tag: &str, name: &str) -> Option<(Range<usize>, Range<usize>)> {
    let lower = tag.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut from = 0;

    while let Some(rel) = lower[from..].find(name) {
        let start = from + rel;
        from = start + 1;

        // Attribute names are introduced by whitespace; anything else is a
        // substring of another name or of a value.
        if !tag[..start].ends_with(|c: char| c.is_whitespace()) {
            continue;
        }
        let name_end = start + name.len();
        if bytes
            .get(name_end)
            .is_some_and(|&c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
        {
            continue;
        }

        let attr_start = tag[..start].trim_end().len();
        let mut i = name_end;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return Some((attr_start..name_end, name_end..name_end));
        }
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }

        return match bytes.get(i).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = i + 1;
                lower[value_start..].find(quote as char).map(|p| {
                    let value_end = value_start + p;
                    (attr_start..value_end + 1, value_start..value_end)
                })
            }
            Some(_) => {
                let value_start = i;
                let mut value_end = value_start;
                while bytes
                    .get(value_end)
                    .is_some_and(|&c| !c.is_ascii_whitespace() && c != b'>')
                {
                    value_end += 1;
                }
                Some((attr_start..value_end, value_start..value_end))
            }
            None => Some((attr_start..i, i..i)),
        };
    }
    None
}

/// Returns the value of `name` inside `tag`, if the attribute is present.
pub(crate) fn attr_value<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    attr_span(tag, name).map(|(_, value)| &tag[value])
}

/// Whether `tag` carries the attribute `name`, valued or bare.
pub(crate) fn has_attr(tag: &str, name: &str) -> bool {
    attr_span(tag, name).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_quoted_forms() {
        assert_eq!(attr_value(r#"<img src="a.png">"#, "src"), Some("a.png"));
        assert_eq!(attr_value("<img src='a.png'>", "src"), Some("a.png"));
        assert_eq!(attr_value("<img src=a.png>", "src"), Some("a.png"));
    }

    #[test]
    fn test_attr_value_case_insensitive() {
        assert_eq!(attr_value(r#"<IMG SRC="A.png">"#, "src"), Some("A.png"));
    }

    #[test]
    fn test_attr_name_boundaries() {
        // `data-src` is not `src`
        assert_eq!(attr_value(r#"<img data-src="a.png">"#, "src"), None);
        // value containing the attribute name is not a match
        assert_eq!(attr_value(r#"<img alt="src=x">"#, "src"), None);
    }

    #[test]
    fn test_bare_attribute() {
        assert!(has_attr("<img ismap>", "ismap"));
        assert_eq!(attr_value("<img ismap>", "ismap"), Some(""));
    }

    #[test]
    fn test_attr_span_covers_leading_whitespace() {
        let tag = r#"<img  width="4" src=x>"#;
        let (attr, _) = attr_span(tag, "width").unwrap();
        let mut removed = tag.to_string();
        removed.replace_range(attr, "");
        assert_eq!(removed, "<img src=x>");
    }
}
