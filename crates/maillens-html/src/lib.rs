//! # maillens-html
//!
//! HTML transform library for rendering untrusted email bodies.
//!
//! This crate provides:
//! - **Sanitizer** - removes script, event handlers, iframes, and other
//!   constructs capable of executing code or hijacking navigation
//! - **Privacy transforms** - tracking-pixel removal, remote-image blocking,
//!   tracking-parameter stripping, invisible-character cleanup
//! - **Tracker detection** - heuristic vendor identification for a
//!   "N trackers blocked" affordance
//! - **Plain-text extraction** - tag stripping and entity decoding for
//!   previews, summaries, and printing
//! - **Inline-image resolution** - `cid:` references rewritten to `data:` URIs
//! - **Document builder** - wraps a transformed body into one self-contained
//!   document with embedded CSS and a Content-Security-Policy
//!
//! Every function here is a total `&str -> String` transform: malformed or
//! adversarial input degrades to imperfectly-cleaned output, never an error.
//! The emitted Content-Security-Policy is the structural backstop for
//! anything the pattern-based rules miss.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod pattern;

pub mod document;
pub mod inline;
pub mod privacy;
pub mod sanitize;
pub mod settings;
pub mod text;
pub mod trackers;

pub use document::build_document;
pub use inline::{InlinePart, resolve_inline_images};
pub use privacy::{
    block_remote_images, inject_lazy_loading, strip_invisible_characters, strip_tracking_parameters,
    strip_tracking_pixels,
};
pub use sanitize::sanitize;
pub use settings::RenderSettings;
pub use text::{html_to_text, preview};
pub use trackers::{TrackerReport, detect};
