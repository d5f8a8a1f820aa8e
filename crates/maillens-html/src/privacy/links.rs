//! Link query-string cleanup.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::pattern::fixed;

/// Query parameters that exist to attribute the click, not to address the
/// resource.
pub const TRACKING_PARAMETERS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "gclid",
    "fbclid",
    "mc_eid",
    "mc_cid",
    "igshid",
    "_hsenc",
    "_hsmi",
    "mkt_tok",
];

/// `href` attributes in quoted or unquoted form.
static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| fixed(r#"(?i)\bhref\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#));

/// Removes known tracking parameters from every link in the document.
///
/// Each `href` is parsed as a URL. When the query string carries a parameter
/// whose lowercased name is in [`TRACKING_PARAMETERS`], the URL is rebuilt
/// with those parameters removed, preserving every other parameter and its
/// position and dropping the `?` when nothing remains. An href that fails to
/// parse, or has no blocklisted parameter, is left byte-for-byte unchanged.
#[must_use]
pub fn strip_tracking_parameters(html: &str) -> String {
    HREF_ATTR
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let whole = &caps[0];
            let raw = &caps[1];
            let (quote, value) = match raw.as_bytes().first() {
                Some(&b'"') => ("\"", &raw[1..raw.len() - 1]),
                Some(&b'\'') => ("'", &raw[1..raw.len() - 1]),
                _ => ("", &raw[..]),
            };
            clean_href(value).map_or_else(
                || whole.to_string(),
                |cleaned| {
                    let prefix = &whole[..whole.len() - raw.len()];
                    format!("{prefix}{quote}{cleaned}{quote}")
                },
            )
        })
        .into_owned()
}

/// Returns the rebuilt URL, or `None` when the href should stay untouched.
fn clean_href(href: &str) -> Option<String> {
    // Attribute values usually spell the separator as `&amp;`; decode for
    // parsing and restore on the way out.
    let had_entity_amp = href.contains("&amp;");
    let decoded: Cow<'_, str> = if had_entity_amp {
        Cow::Owned(href.replace("&amp;", "&"))
    } else {
        Cow::Borrowed(href)
    };

    let parsed = Url::parse(&decoded).ok()?;
    parsed.query()?;

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let retained: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(name, _)| !TRACKING_PARAMETERS.contains(&name.to_ascii_lowercase().as_str()))
        .collect();
    if retained.len() == pairs.len() {
        return None;
    }

    let mut cleaned = parsed;
    cleaned.set_query(None);
    if !retained.is_empty() {
        let mut query = cleaned.query_pairs_mut();
        for (name, value) in retained {
            query.append_pair(name, value);
        }
    }

    let mut out = String::from(cleaned);
    if had_entity_amp {
        out = out.replace('&', "&amp;");
    }
    Some(out)
}
