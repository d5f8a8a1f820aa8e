//! Tracker detection heuristics.
//!
//! Scans raw (pre-sanitization) bodies for evidence of open tracking and
//! produces the vendor list behind a "N trackers blocked" affordance. Purely
//! informational: detection never blocks or alters rendering, and a missed
//! tracker is an accepted false negative.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::fixed;
use crate::privacy::{IMG_TAG, attr_value};

/// Tracking vendors identified across a thread's message bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerReport {
    /// Deduplicated, sorted vendor display names.
    pub vendor_names: BTreeSet<String>,
    /// Number of distinct vendors found.
    pub count: usize,
}

impl TrackerReport {
    /// Whether no tracker was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendor_names.is_empty()
    }
}

/// Display name used when the structural scan finds a pixel that no vendor
/// domain accounts for.
const GENERIC_PIXEL_LABEL: &str = "Tracking pixel";

/// Known email-marketing and analytics domains, mapped to display names.
const VENDOR_DOMAINS: &[(&str, &str)] = &[
    ("mailchimp.com", "Mailchimp"),
    ("list-manage.com", "Mailchimp"),
    ("mandrillapp.com", "Mandrill"),
    ("sendgrid.net", "SendGrid"),
    ("sendgrid.com", "SendGrid"),
    ("constantcontact.com", "Constant Contact"),
    ("rs6.net", "Constant Contact"),
    ("hubspot.com", "HubSpot"),
    ("hs-analytics.net", "HubSpot"),
    ("hubspotlinks.com", "HubSpot"),
    ("marketo.com", "Marketo"),
    ("mktoresp.com", "Marketo"),
    ("pardot.com", "Pardot"),
    ("exacttarget.com", "Salesforce Marketing Cloud"),
    ("exct.net", "Salesforce Marketing Cloud"),
    ("klaviyo.com", "Klaviyo"),
    ("braze.com", "Braze"),
    ("iterable.com", "Iterable"),
    ("customer.io", "Customer.io"),
    ("intercom.io", "Intercom"),
    ("mixpanel.com", "Mixpanel"),
    ("amplitude.com", "Amplitude"),
    ("google-analytics.com", "Google Analytics"),
    ("googletagmanager.com", "Google Tag Manager"),
    ("doubleclick.net", "DoubleClick"),
    ("mailgun.org", "Mailgun"),
    ("sparkpostmail.com", "SparkPost"),
    ("createsend.com", "Campaign Monitor"),
    ("cmail19.com", "Campaign Monitor"),
    ("sailthru.com", "Sailthru"),
    ("responsys.net", "Oracle Responsys"),
    ("eloqua.com", "Eloqua"),
    ("activecampaign.com", "ActiveCampaign"),
    ("convertkit.com", "ConvertKit"),
    ("getresponse.com", "GetResponse"),
    ("aweber.com", "AWeber"),
    ("mailjet.com", "Mailjet"),
];

/// Cheap keywords whose presence justifies the structural scan even after a
/// vendor domain already matched.
const HINT_KEYWORDS: &[&str] = &["pixel", "track", "beacon", "open", "click"];

/// `display:none` in an inline style value.
static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| fixed(r"display\s*:\s*none"));

/// Scans raw message bodies and reports the tracking vendors found.
///
/// Two signals, combined per body against its lower-cased text: a substring
/// match over [`VENDOR_DOMAINS`], and a structural scan for 1x1-declared or
/// `display:none` images. The structural scan only runs when no domain
/// matched or the body carries a hint keyword, which bounds its cost on
/// bodies unlikely to contain pixels.
#[must_use]
pub fn detect<'a>(bodies: impl IntoIterator<Item = &'a str>) -> TrackerReport {
    let mut vendor_names = BTreeSet::new();

    for body in bodies {
        let lower = body.to_lowercase();
        let mut matched = false;
        for (domain, vendor) in VENDOR_DOMAINS {
            if lower.contains(domain) {
                vendor_names.insert((*vendor).to_string());
                matched = true;
            }
        }

        let scan_worthwhile = !matched || HINT_KEYWORDS.iter().any(|k| lower.contains(k));
        if scan_worthwhile && has_structural_pixel(&lower) {
            vendor_names.insert(GENERIC_PIXEL_LABEL.to_string());
        }
    }

    TrackerReport {
        count: vendor_names.len(),
        vendor_names,
    }
}

fn has_structural_pixel(lower_body: &str) -> bool {
    IMG_TAG.find_iter(lower_body).any(|m| {
        let tag = m.as_str();
        let tiny = matches!(
            (attr_value(tag, "width"), attr_value(tag, "height")),
            (Some(w), Some(h)) if is_zero_or_one(w) && is_zero_or_one(h)
        );
        tiny || attr_value(tag, "style").is_some_and(|style| HIDDEN_STYLE.is_match(style))
    })
}

fn is_zero_or_one(value: &str) -> bool {
    matches!(value.trim().trim_end_matches("px"), "0" | "1")
}
