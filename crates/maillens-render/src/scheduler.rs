//! Thread render scheduling.

use std::sync::Arc;

use maillens_html::{RenderSettings, detect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

use crate::cache::RenderCache;
use crate::model::{MessageId, RenderEvent, ThreadMessage};
use crate::worker::RenderWorker;

/// Schedules background renders for a thread of messages.
///
/// [`prepare_thread`](Self::prepare_thread) synchronously seeds a
/// placeholder for every message, renders the selected message first,
/// fans out over the remainder in thread order, and finally publishes a
/// tracker report. The host consumes completion through the
/// [`RenderEvent`] receiver; dropping the receiver on view teardown
/// discards late results without needing a cancellation token.
#[derive(Debug)]
pub struct ThreadScheduler {
    worker: Arc<RenderWorker>,
    cache: Arc<RenderCache>,
    events: UnboundedSender<RenderEvent>,
}

impl ThreadScheduler {
    /// Creates a scheduler publishing into `cache`, returning the event
    /// stream the host should poll.
    #[must_use]
    pub fn new(cache: Arc<RenderCache>) -> (Self, UnboundedReceiver<RenderEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                worker: Arc::new(RenderWorker::new()),
                cache,
                events,
            },
            receiver,
        )
    }

    /// Returns the cache this scheduler publishes into.
    #[must_use]
    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    /// Kicks off rendering for a freshly opened thread.
    ///
    /// Placeholders are seeded synchronously before this returns, so a
    /// lookup immediately afterwards has something to show with zero
    /// latency. The selected message's entry is published no later than any
    /// other entry from this pass. Must be called from within a tokio
    /// runtime.
    pub fn prepare_thread(
        &self,
        thread: Vec<ThreadMessage>,
        selected: MessageId,
        settings: RenderSettings,
    ) {
        self.cache.reconcile_settings(settings);
        for message in &thread {
            self.cache
                .seed_placeholder(message.id, message.preview.clone());
        }

        let worker = Arc::clone(&self.worker);
        let cache = Arc::clone(&self.cache);
        let events = self.events.clone();
        tokio::spawn(async move {
            run_pass(&worker, &cache, &events, thread, selected, settings).await;
        });
    }
}

async fn run_pass(
    worker: &Arc<RenderWorker>,
    cache: &Arc<RenderCache>,
    events: &UnboundedSender<RenderEvent>,
    thread: Vec<ThreadMessage>,
    selected: MessageId,
    settings: RenderSettings,
) {
    // Selected message first: its entry must never trail another's.
    if let Some(message) = thread.iter().find(|m| m.id == selected) {
        render_one(worker, cache, events, message, settings).await;
    } else {
        tracing::debug!(id = selected.get(), "selected message not in thread");
    }

    let mut renders = JoinSet::new();
    for message in thread.iter().filter(|m| m.id != selected).cloned() {
        let worker = Arc::clone(worker);
        let cache = Arc::clone(cache);
        let events = events.clone();
        renders.spawn(async move {
            render_one(&worker, &cache, &events, &message, settings).await;
        });
    }
    while renders.join_next().await.is_some() {}

    // All bodies are in; derive the blocked-tracker affordance for the
    // whole thread.
    if settings.block_tracking_pixels {
        let report = detect(thread.iter().map(|m| m.raw_html.as_str()));
        tracing::debug!(count = report.count, "tracker detection complete");
        let _ = events.send(RenderEvent::TrackersDetected(report));
    }
}

async fn render_one(
    worker: &RenderWorker,
    cache: &RenderCache,
    events: &UnboundedSender<RenderEvent>,
    message: &ThreadMessage,
    settings: RenderSettings,
) {
    if cache.is_ready(message.id) {
        return;
    }
    let result = worker
        .render(
            message.id,
            message.raw_html.clone(),
            message.inline_parts.clone(),
            settings,
        )
        .await;
    match result {
        Ok(body) => {
            cache.publish(message.id, Arc::clone(&body));
            let _ = events.send(RenderEvent::BodyReady {
                id: message.id,
                body,
            });
        }
        Err(err) => {
            tracing::warn!(id = message.id.get(), ?err, "background render failed");
        }
    }
}
