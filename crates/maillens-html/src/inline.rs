//! Inline (`cid:`) image resolution.
//!
//! Multipart/related messages reference attached image parts by Content-ID.
//! The finished document runs under `img-src data:`, so those references
//! must be embedded as `data:` URIs before display; nothing is fetched.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::pattern::fixed;

/// An image part available for `cid:` resolution.
#[derive(Debug, Clone)]
pub struct InlinePart {
    /// The part's Content-ID, with or without angle brackets.
    pub content_id: String,
    /// MIME type of the payload, e.g. `image/png`.
    pub media_type: String,
    /// Decoded payload bytes.
    pub data: Vec<u8>,
}

/// Quoted `src="cid:…"` references.
static CID_SRC: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?i)src\s*=\s*["']cid:([^"']+)["']"#));

/// Replaces `src="cid:…"` references with `data:` URIs built from the
/// matching parts.
///
/// Content-IDs are compared case-insensitively with angle brackets ignored,
/// matching how mail generators vary the spelling. A reference with no
/// matching part is left alone; the document policy keeps it inert.
#[must_use]
pub fn resolve_inline_images(html: &str, parts: &[InlinePart]) -> String {
    if parts.is_empty() {
        return html.to_string();
    }
    CID_SRC
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let cid = caps[1].trim_matches(['<', '>']);
            parts
                .iter()
                .find(|part| part.content_id.trim_matches(['<', '>']).eq_ignore_ascii_case(cid))
                .map_or_else(
                    || caps[0].to_string(),
                    |part| {
                        format!(
                            "src=\"data:{};base64,{}\"",
                            part.media_type,
                            STANDARD.encode(&part.data)
                        )
                    },
                )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logo_part() -> InlinePart {
        InlinePart {
            content_id: "<logo@example>".to_string(),
            media_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4E, 0x47],
        }
    }

    #[test]
    fn test_cid_reference_resolved() {
        let html = r#"<img src="cid:logo@example" alt="logo">"#;
        let out = resolve_inline_images(html, &[logo_part()]);
        assert_eq!(
            out,
            r#"<img src="data:image/png;base64,iVBORw==" alt="logo">"#
        );
    }

    #[test]
    fn test_content_id_comparison_ignores_brackets_and_case() {
        let html = r#"<img src="cid:LOGO@EXAMPLE">"#;
        let out = resolve_inline_images(html, &[logo_part()]);
        assert!(out.starts_with(r#"<img src="data:image/png;base64,"#));
    }

    #[test]
    fn test_unmatched_reference_left_alone() {
        let html = r#"<img src="cid:other@example">"#;
        assert_eq!(resolve_inline_images(html, &[logo_part()]), html);
    }

    #[test]
    fn test_no_parts_is_identity() {
        let html = r#"<img src="cid:logo@example">"#;
        assert_eq!(resolve_inline_images(html, &[]), html);
    }
}
