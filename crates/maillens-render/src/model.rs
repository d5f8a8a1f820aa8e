//! Data models for the render pipeline.

use std::sync::Arc;

use maillens_html::{InlinePart, TrackerReport};

/// Unique identifier for a message within a thread view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u32);

impl MessageId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// The three artifacts produced by one render of one message.
///
/// Immutable once created and shared behind an [`Arc`]; a value is only
/// valid for the settings snapshot it was rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    /// Defanged-but-still-HTML form, for printing and cache fallback.
    pub sanitized_html: String,
    /// Plain-text form, for previews, summarization, and length gating.
    pub plain_text: String,
    /// The complete, self-contained document handed to the display surface.
    pub styled_document: String,
}

/// One message of a thread as handed to the scheduler.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Raw, untrusted HTML body as fetched.
    pub raw_html: String,
    /// Cheap preview snippet already available from the envelope.
    pub preview: String,
    /// Inline image parts available for `cid:` resolution.
    pub inline_parts: Vec<InlinePart>,
}

impl ThreadMessage {
    /// Creates a thread message without inline parts.
    #[must_use]
    pub const fn new(id: MessageId, raw_html: String, preview: String) -> Self {
        Self {
            id,
            raw_html,
            preview,
            inline_parts: Vec::new(),
        }
    }
}

/// Completion notifications published by the scheduler.
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// A message's rendered body reached the cache.
    BodyReady {
        /// The message that finished rendering.
        id: MessageId,
        /// The rendered artifacts, as published to the cache.
        body: Arc<RenderedBody>,
    },
    /// Tracker detection ran across the whole thread.
    TrackersDetected(TrackerReport),
}
