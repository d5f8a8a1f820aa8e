//! Tiny/tracking-pixel removal.

use super::{IMG_TAG, attr_value};

/// Declared size at or below which an image is treated as a beacon rather
/// than content. Covers the classic 1x1 and the 2x2 variants used to dodge
/// exact-size filters.
const PIXEL_MAX_DIMENSION: u32 = 2;

/// Filename fragments that mark an image as a tracker when it declares no
/// dimensions at all.
const SRC_HINTS: &[&str] = &["pixel", "track", "beacon", "open", "1x1", "1px"];

/// Removes `<img>` elements that exist to report an open, not to display.
///
/// An image is stripped when its declared `width` and `height` are both at
/// most 2 (in either attribute order), or, with no declared dimensions, when
/// its `src` contains one of a fixed vocabulary of tracker filename hints.
/// Applied on every render; the document CSS adds a second line of defense
/// when `block_tracking_pixels` is enabled.
#[must_use]
pub fn strip_tracking_pixels(html: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if is_tracking_pixel(tag) {
                String::new()
            } else {
                tag.to_string()
            }
        })
        .into_owned()
}

fn is_tracking_pixel(tag: &str) -> bool {
    let width = attr_value(tag, "width").and_then(parse_dimension);
    let height = attr_value(tag, "height").and_then(parse_dimension);

    match (width, height) {
        (Some(w), Some(h)) => w <= PIXEL_MAX_DIMENSION && h <= PIXEL_MAX_DIMENSION,
        _ => attr_value(tag, "src").is_some_and(|src| {
            let src = src.to_ascii_lowercase();
            SRC_HINTS.iter().any(|hint| src.contains(hint))
        }),
    }
}

/// Parses a declared dimension, tolerating a `px` suffix.
fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_by_one_stripped() {
        let html = r#"<p>Hi</p><img src="http://ads.example.com/pixel.gif" width="1" height="1">"#;
        assert_eq!(strip_tracking_pixels(html), "<p>Hi</p>");
    }

    #[test]
    fn test_attribute_order_irrelevant() {
        let html = r#"<img height="1" width="1" src="a.gif">"#;
        assert_eq!(strip_tracking_pixels(html), "");
    }

    #[test]
    fn test_two_by_two_stripped() {
        let html = r#"<img src="b.gif" width="2" height="2">"#;
        assert_eq!(strip_tracking_pixels(html), "");
    }

    #[test]
    fn test_large_image_kept() {
        let html = r#"<img src="photo.jpg" width="600" height="400">"#;
        assert_eq!(strip_tracking_pixels(html), html);
    }

    #[test]
    fn test_src_hint_without_dimensions() {
        let html = r#"<img src="https://mail.example.com/beacon?id=42">"#;
        assert_eq!(strip_tracking_pixels(html), "");
    }

    #[test]
    fn test_src_hint_ignored_when_dimensions_declared() {
        let html = r#"<img src="https://cdn.example.com/track-header.png" width="600" height="120">"#;
        assert_eq!(strip_tracking_pixels(html), html);
    }

    #[test]
    fn test_plain_image_without_dimensions_kept() {
        let html = r#"<img src="https://cdn.example.com/logo.png" alt="logo">"#;
        assert_eq!(strip_tracking_pixels(html), html);
    }
}
