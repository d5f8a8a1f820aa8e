//! Image loading hints and remote-image blocking.

use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::fixed;

use super::{IMG_TAG, attr_span, attr_value, has_attr};

/// 1x1 transparent GIF substituted for the `src` of blocked remote images.
pub const BLOCKED_IMAGE_PLACEHOLDER: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// `<picture>` source elements whose candidate set reaches the network.
static REMOTE_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| fixed(r"(?is)<source\b[^>]*srcset\s*=[^>]*https?://[^>]*>"));

/// `@import url(http…)` statements inside style blocks.
static CSS_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?i)@import\s+url\(\s*["']?https?://[^)"']*["']?\s*\)\s*;?"#));

/// Remote `url(…)` values in CSS, inline or in style blocks.
static CSS_REMOTE_URL: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?i)url\(\s*["']?https?://[^)"']*["']?\s*\)"#));

/// Adds `loading="lazy"` to every `<img>` that does not already declare a
/// loading behavior. Purely a rendering-performance hint, applied on every
/// render.
#[must_use]
pub fn inject_lazy_loading(html: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if has_attr(tag, "loading") {
                tag.to_string()
            } else {
                format!("{} loading=\"lazy\"{}", &tag[..4], &tag[4..])
            }
        })
        .into_owned()
}

/// Rewrites every remote image reference so the document cannot reach the
/// network.
///
/// For each `<img>` with an `http(s)` `src`: the original URL moves to
/// `data-blocked-src` (so enabling remote images on a later render restores
/// it from the raw body, and the host can show a "blocked" affordance), the
/// `src` becomes a transparent placeholder, and `srcset`/`width`/`height`
/// are dropped so a blocked image neither fetches responsive candidates nor
/// leaves a declared-size hole. `<source>` elements with remote candidate
/// sets, remote `url(…)` in inline styles, and `@import url(…)` in style
/// blocks are neutralized as well.
///
/// The effect is governed entirely by the settings flag at render time; the
/// stored raw body is never touched.
#[must_use]
pub fn block_remote_images(html: &str) -> String {
    let html = IMG_TAG.replace_all(html, |caps: &regex::Captures<'_>| block_img(&caps[0]));
    let html = REMOTE_SOURCE.replace_all(&html, "");
    let html = CSS_IMPORT.replace_all(&html, "");
    CSS_REMOTE_URL.replace_all(&html, "none").into_owned()
}

fn block_img(tag: &str) -> String {
    let Some(src) = attr_value(tag, "src") else {
        return tag.to_string();
    };
    if !is_remote(src) {
        return tag.to_string();
    }
    let original = src.to_string();

    let mut out = tag.to_string();
    for name in ["srcset", "width", "height"] {
        while let Some((attr, _)) = attr_span(&out, name) {
            out.replace_range(attr, "");
        }
    }
    if let Some((_, value)) = attr_span(&out, "src") {
        out.replace_range(value, BLOCKED_IMAGE_PLACEHOLDER);
    }
    if let Some(end) = out.rfind('>') {
        let end = if out[..end].ends_with('/') { end - 1 } else { end };
        let escaped = original.replace('"', "&quot;");
        out.insert_str(end, &format!(" data-blocked-src=\"{escaped}\""));
    }
    out
}

fn is_remote(src: &str) -> bool {
    let src = src.trim().to_ascii_lowercase();
    src.starts_with("http://") || src.starts_with("https://")
}
