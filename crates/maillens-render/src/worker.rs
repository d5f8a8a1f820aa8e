//! Exclusive, coalescing render worker.
//!
//! Runs the transform chain off the caller's thread. The invariant this
//! module exists to uphold: never two concurrent renders of the same
//! message id. A second request for an id already in flight waits on the
//! pending result instead of duplicating the work.

use std::collections::HashMap;
use std::sync::Arc;

use maillens_html::{
    InlinePart, RenderSettings, block_remote_images, build_document, html_to_text,
    inject_lazy_loading, resolve_inline_images, sanitize, strip_invisible_characters,
    strip_tracking_parameters, strip_tracking_pixels,
};
use tokio::sync::{Mutex, watch};

use crate::error::{Error, Result};
use crate::model::{MessageId, RenderedBody};

type Pending = watch::Receiver<Option<Arc<RenderedBody>>>;

/// Renders message bodies on the blocking pool, one in-flight render per
/// message id. Renders for different ids run freely in parallel.
#[derive(Debug, Default)]
pub struct RenderWorker {
    inflight: Mutex<HashMap<MessageId, Pending>>,
}

impl RenderWorker {
    /// Creates a worker with no renders in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders one message body, or coalesces into the render already in
    /// flight for the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the background task panicked or was cancelled,
    /// or if a coalesced render was abandoned before publishing a result.
    pub async fn render(
        &self,
        id: MessageId,
        raw_html: String,
        inline_parts: Vec<InlinePart>,
        settings: RenderSettings,
    ) -> Result<Arc<RenderedBody>> {
        let publisher = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(&id) {
                Some(pending) => {
                    let pending = pending.clone();
                    drop(inflight);
                    tracing::debug!(id = id.get(), "coalescing into in-flight render");
                    return wait_for(pending).await;
                }
                None => {
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(id, rx);
                    tx
                }
            }
        };

        tracing::debug!(id = id.get(), "render started");
        let outcome =
            tokio::task::spawn_blocking(move || render_body(&raw_html, &inline_parts, settings))
                .await;

        self.inflight.lock().await.remove(&id);

        match outcome {
            Ok(body) => {
                let body = Arc::new(body);
                // A send error only means nobody coalesced; the result is
                // still returned to this caller.
                let _ = publisher.send(Some(Arc::clone(&body)));
                tracing::debug!(id = id.get(), "render complete");
                Ok(body)
            }
            Err(err) => {
                tracing::warn!(id = id.get(), ?err, "render task failed");
                Err(Error::Task(err))
            }
        }
    }
}

async fn wait_for(mut pending: Pending) -> Result<Arc<RenderedBody>> {
    loop {
        if let Some(body) = pending.borrow().clone() {
            return Ok(body);
        }
        if pending.changed().await.is_err() {
            return Err(Error::Abandoned);
        }
    }
}

/// Runs the full transform chain for one body, synchronously.
///
/// Sanitize, resolve inline parts, apply the privacy stages in their fixed
/// order, derive the plain-text form from the sanitized HTML, and wrap the
/// result into the styled document. Exposed for hosts that need a render
/// outside the worker (printing, tests).
#[must_use]
pub fn render_body(
    raw_html: &str,
    inline_parts: &[InlinePart],
    settings: RenderSettings,
) -> RenderedBody {
    let sanitized_html = sanitize(raw_html);

    let mut body = resolve_inline_images(&sanitized_html, inline_parts);
    body = strip_invisible_characters(&body);
    body = strip_tracking_pixels(&body);
    body = inject_lazy_loading(&body);
    if settings.block_remote_images {
        body = block_remote_images(&body);
    }
    if settings.strip_tracking_parameters {
        body = strip_tracking_parameters(&body);
    }

    let plain_text = html_to_text(&sanitized_html);
    let styled_document = build_document(&body, settings);

    RenderedBody {
        sanitized_html,
        plain_text,
        styled_document,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_body_produces_all_artifacts() {
        let raw = r#"<p onclick="x()">Hello <b>there</b></p><script>evil()</script>"#;
        let rendered = render_body(raw, &[], RenderSettings::default());

        assert_eq!(rendered.sanitized_html, "<p>Hello <b>there</b></p>");
        assert_eq!(rendered.plain_text, "Hello there");
        assert!(rendered.styled_document.contains("<p>Hello <b>there</b></p>"));
        assert!(rendered.styled_document.contains("Content-Security-Policy"));
    }

    #[test]
    fn test_render_body_blocks_remote_images_when_enabled() {
        let raw = r#"<img src="https://cdn.example.com/banner.jpg" width="600" height="200">"#;
        let rendered = render_body(raw, &[], RenderSettings::default());
        assert!(!rendered.styled_document.contains(r#" src="https://"#));
        assert!(
            rendered
                .styled_document
                .contains(r#"data-blocked-src="https://cdn.example.com/banner.jpg""#)
        );
    }

    #[test]
    fn test_render_body_keeps_remote_images_when_allowed() {
        let raw = r#"<img src="https://cdn.example.com/banner.jpg" width="600" height="200">"#;
        let settings = RenderSettings {
            block_remote_images: false,
            ..RenderSettings::default()
        };
        let rendered = render_body(raw, &[], settings);
        assert!(
            rendered
                .styled_document
                .contains(r#"src="https://cdn.example.com/banner.jpg""#)
        );
    }

    #[test]
    fn test_tracking_pixel_never_reaches_document() {
        let raw = r#"<img src="http://ads.example.com/pixel.gif" width="1" height="1"><p>Hi</p>"#;
        let rendered = render_body(raw, &[], RenderSettings::default());
        assert!(!rendered.styled_document.contains("ads.example.com"));
        assert!(rendered.styled_document.contains("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn test_worker_renders_off_thread() {
        let worker = RenderWorker::new();
        let body = worker
            .render(
                MessageId(1),
                "<p>hello</p>".to_string(),
                Vec::new(),
                RenderSettings::default(),
            )
            .await
            .unwrap();
        assert_eq!(body.plain_text, "hello");
    }

    #[tokio::test]
    async fn test_concurrent_renders_of_one_id_coalesce() {
        let worker = RenderWorker::new();
        let raw = "<p>same message</p>".to_string();
        let (first, second) = tokio::join!(
            worker.render(
                MessageId(7),
                raw.clone(),
                Vec::new(),
                RenderSettings::default()
            ),
            worker.render(MessageId(7), raw, Vec::new(), RenderSettings::default()),
        );
        let first = first.unwrap();
        let second = second.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_different_ids_render_independently() {
        let worker = RenderWorker::new();
        let (a, b) = tokio::join!(
            worker.render(
                MessageId(1),
                "<p>a</p>".to_string(),
                Vec::new(),
                RenderSettings::default()
            ),
            worker.render(
                MessageId(2),
                "<p>b</p>".to_string(),
                Vec::new(),
                RenderSettings::default()
            ),
        );
        assert_eq!(a.unwrap().plain_text, "a");
        assert_eq!(b.unwrap().plain_text, "b");
    }
}
