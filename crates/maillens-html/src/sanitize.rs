//! HTML sanitization for untrusted email bodies.
//!
//! Removes or neutralizes constructs capable of executing code or navigating
//! away from the message context: script blocks, inline event handlers,
//! `javascript:` URIs, iframes, meta refreshes, base tags, plugin elements,
//! and forms. Rules are pattern transforms over the raw markup rather than a
//! DOM parse; the Content-Security-Policy emitted by
//! [`build_document`](crate::build_document) backstops anything a pattern
//! misses.

use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::fixed;

/// Upper bound on full-ruleset passes.
///
/// Removing one construct can splice its neighbors into a new one
/// (`<scr<iframe></iframe>ipt>` becomes `<script>` once the iframe is gone),
/// so the ruleset re-runs until the output is stable. Real mail converges in
/// one or two passes; the cap bounds pathological splice chains.
const MAX_PASSES: usize = 16;

/// Paired `<script>` blocks, tag and content.
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| fixed(r"(?is)<script\b[^>]*>.*?</script\s*>"));

/// An opening `<script>` tag with no matching close (truncated or malformed
/// markup). Everything after it would execute, so the tag itself must go.
static SCRIPT_OPEN: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)<script\b[^>]*>"));

/// Inline event-handler attributes: `onclick="…"`, `onload='…'`, `onerror=x`.
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#));

/// `javascript:` URI scheme, with optional internal whitespace.
static JS_SCHEME: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)javascript\s*:"));

/// `<iframe>` elements, paired or self-closing.
static IFRAME: LazyLock<Regex> =
    LazyLock::new(|| fixed(r"(?is)<iframe\b[^>]*>.*?</iframe\s*>|<iframe\b[^>]*/?>"));

/// `<meta http-equiv="refresh">` redirects.
static META_REFRESH: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?is)<meta\b[^>]*http-equiv\s*=\s*["']?refresh["']?[^>]*>"#));

/// `<base>` tags (rebase every relative URL in the document).
static BASE_TAG: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)<base\b[^>]*>"));

/// `<object>` elements, paired or self-closing.
static OBJECT: LazyLock<Regex> =
    LazyLock::new(|| fixed(r"(?is)<object\b[^>]*>.*?</object\s*>|<object\b[^>]*/?>"));

/// `<embed>` elements.
static EMBED: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)<embed\b[^>]*/?>"));

/// Opening `<form>` tags.
static FORM_OPEN: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)<form\b[^>]*>"));

/// Closing `</form>` tags.
static FORM_CLOSE: LazyLock<Regex> = LazyLock::new(|| fixed(r"(?i)</form\s*>"));

/// One application of every rule, in order.
fn apply_rules(html: &str) -> String {
    // Script removal runs first so the attribute rules never fire on
    // fragments of script source.
    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = SCRIPT_OPEN.replace_all(&html, "");

    let html = EVENT_HANDLER.replace_all(&html, "");
    let html = JS_SCHEME.replace_all(&html, "blocked:");

    let html = IFRAME.replace_all(&html, "");
    let html = META_REFRESH.replace_all(&html, "");
    let html = BASE_TAG.replace_all(&html, "");
    let html = OBJECT.replace_all(&html, "");
    let html = EMBED.replace_all(&html, "");

    // Forms keep their visual structure (surveys, styled layouts) but lose
    // the ability to submit.
    let html = FORM_OPEN.replace_all(&html, r#"<div class="form-disabled">"#);
    FORM_CLOSE.replace_all(&html, "</div>").into_owned()
}

/// Removes dangerous constructs from raw email HTML.
///
/// Total and idempotent: malformed markup degrades to imperfectly-cleaned
/// output rather than an error, and sanitizing already-sanitized HTML is a
/// no-op. Content inside removed containers (scripts, iframes, objects) is
/// dropped with the container; content around neutralized constructs
/// (`javascript:` links, forms) is preserved.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAX_PASSES {
        let next = apply_rules(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_script_block_removed_with_content() {
        let html = r"<p>Hi</p><script>steal(document.cookie)</script><p>Bye</p>";
        assert_eq!(sanitize(html), "<p>Hi</p><p>Bye</p>");
    }

    #[test]
    fn test_script_case_and_attributes() {
        let html = r#"<SCRIPT type="text/javascript" src="evil.js"></SCRIPT>ok"#;
        assert_eq!(sanitize(html), "ok");
    }

    #[test]
    fn test_unclosed_script_tag_removed() {
        let html = r"<p>a</p><script>never closed";
        let clean = sanitize(html);
        assert!(!clean.to_lowercase().contains("<script"));
        assert!(clean.contains("<p>a</p>"));
    }

    #[test]
    fn test_spliced_script_does_not_survive() {
        let html = r"<scr<iframe></iframe>ipt>alert(1)</scr<iframe></iframe>ipt>";
        let clean = sanitize(html);
        assert!(!clean.to_lowercase().contains("<script"));
    }

    #[test]
    fn test_event_handlers_removed_content_kept() {
        let html = r#"<p onclick="steal()">Click</p>"#;
        assert_eq!(sanitize(html), "<p>Click</p>");
    }

    #[test]
    fn test_event_handler_forms() {
        let double = r#"<img src="a.png" onerror="x()">"#;
        let single = r"<img src='a.png' onerror='x()'>";
        let bare = r"<img src=a.png onerror=x()>";
        for html in [double, single, bare] {
            let clean = sanitize(html);
            assert!(!clean.to_lowercase().contains("onerror"), "in {clean}");
        }
    }

    #[test]
    fn test_javascript_uri_neutralized_not_deleted() {
        let html = r#"<a href="javascript:alert(1)">link</a>"#;
        assert_eq!(sanitize(html), r#"<a href="blocked:alert(1)">link</a>"#);
    }

    #[test]
    fn test_javascript_uri_with_whitespace() {
        let html = r#"<a href="JaVaScRiPt :alert(1)">x</a>"#;
        assert!(!sanitize(html).to_lowercase().contains("javascript"));
    }

    #[test]
    fn test_iframe_removed_both_forms() {
        let paired = r#"<iframe src="https://evil.example"></iframe>after"#;
        let selfclosing = r#"<iframe src="https://evil.example"/>after"#;
        assert_eq!(sanitize(paired), "after");
        assert_eq!(sanitize(selfclosing), "after");
    }

    #[test]
    fn test_meta_refresh_and_base_removed() {
        let html = r#"<meta http-equiv="refresh" content="0;url=https://evil.example"><base href="https://evil.example/"><p>body</p>"#;
        assert_eq!(sanitize(html), "<p>body</p>");
    }

    #[test]
    fn test_charset_meta_preserved() {
        let html = r#"<meta charset="utf-8"><p>body</p>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_object_and_embed_removed() {
        let html = r#"<object data="a.swf"><param name="x"></object><embed src="a.swf">text"#;
        assert_eq!(sanitize(html), "text");
    }

    #[test]
    fn test_form_rewritten_to_div() {
        let html = r#"<form action="https://evil.example" method="post"><input name="q"></form>"#;
        assert_eq!(
            sanitize(html),
            r#"<div class="form-disabled"><input name="q"></div>"#
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let html = "Just a normal sentence with no markup & an ampersand.";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_idempotent_on_handcrafted_inputs() {
        let inputs = [
            r#"<p onclick="a()">x</p><script>b()</script>"#,
            r"<scr<script></script>ipt>alert(1)</script>",
            r#"<form><iframe src="x"></iframe></form>"#,
            r#"<a href="javascript:void(0)">j</a>"#,
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "for {input}");
        }
    }

    /// Fragments that exercise every rule, including broken/partial markup.
    fn html_fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("<p>hello</p>".to_string()),
            Just("<script>alert(1)</script>".to_string()),
            Just("<script src=x>".to_string()),
            Just("</script>".to_string()),
            Just("<scr".to_string()),
            Just("ipt>".to_string()),
            Just(" onclick=\"x()\"".to_string()),
            Just(" onload=bare".to_string()),
            Just("<a href=\"javascript:go()\">l</a>".to_string()),
            Just("<iframe src=a></iframe>".to_string()),
            Just("<form>".to_string()),
            Just("</form>".to_string()),
            Just("<base href=x>".to_string()),
            Just("&amp; plain text ".to_string()),
            "[a-zA-Z0-9<>/\"'= ]{0,20}",
        ]
    }

    proptest! {
        #[test]
        fn test_sanitize_idempotent(parts in proptest::collection::vec(html_fragment(), 0..8)) {
            let input = parts.concat();
            let once = sanitize(&input);
            let twice = sanitize(&once);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn test_no_script_survives(parts in proptest::collection::vec(html_fragment(), 0..8)) {
            let clean = sanitize(&parts.concat()).to_lowercase();
            prop_assert!(!clean.contains("<script"));
            prop_assert!(!clean.contains("javascript:"));
            prop_assert!(!clean.contains("<iframe"));
        }
    }
}
