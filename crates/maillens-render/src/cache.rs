//! Per-thread render cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use maillens_html::RenderSettings;

use crate::model::{MessageId, RenderedBody};

/// Recommended delay before the host swaps a placeholder for a skeleton.
///
/// Most renders finish well inside this window; showing a skeleton
/// immediately would flicker on every message open.
pub const SKELETON_GRACE: Duration = Duration::from_millis(150);

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// The rendered body is available.
    Ready(Arc<RenderedBody>),
    /// A render is scheduled or running; show the preview until it lands.
    Pending {
        /// Cheap placeholder text for immediate display.
        preview: String,
    },
    /// The id has not been seen by a scheduling pass.
    Unknown,
}

#[derive(Debug)]
struct CacheEntry {
    preview: String,
    body: Option<Arc<RenderedBody>>,
}

/// Thread-scoped map from message id to render state.
///
/// Readers on the UI thread observe either "not ready" or a fully formed
/// entry, never a partial one; the worker completing a render is the only
/// writer for its id. Entries are tied to the settings snapshot they were
/// rendered under and dropped wholesale when that snapshot changes - a stale
/// entry must never be served.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: RwLock<HashMap<MessageId, CacheEntry>>,
    settings: Mutex<Option<RenderSettings>>,
}

impl RenderCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the cache when `settings` differs from the snapshot the
    /// current entries were rendered under. Returns whether entries were
    /// invalidated.
    pub fn reconcile_settings(&self, settings: RenderSettings) -> bool {
        let mut stored = self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *stored == Some(settings) {
            return false;
        }
        let invalidated = stored.is_some();
        *stored = Some(settings);
        drop(stored);

        if invalidated {
            self.write().clear();
            tracing::debug!("render cache invalidated by settings change");
        }
        invalidated
    }

    /// Seeds a placeholder entry, keeping any rendered body already present.
    pub fn seed_placeholder(&self, id: MessageId, preview: String) {
        self.write()
            .entry(id)
            .or_insert_with(|| CacheEntry {
                preview,
                body: None,
            });
    }

    /// Publishes a completed render.
    ///
    /// Idempotent and keyed by id, so a result arriving after the view tore
    /// the cache down just recreates a harmless entry that is dropped with
    /// the cache.
    pub fn publish(&self, id: MessageId, body: Arc<RenderedBody>) {
        let mut entries = self.write();
        let entry = entries.entry(id).or_insert_with(|| CacheEntry {
            preview: String::new(),
            body: None,
        });
        entry.body = Some(body);
    }

    /// Looks up the render state for one message. Never an error: an
    /// unrendered id is simply not ready yet.
    #[must_use]
    pub fn lookup(&self, id: MessageId) -> CacheLookup {
        match self.read().get(&id) {
            Some(CacheEntry {
                body: Some(body), ..
            }) => CacheLookup::Ready(Arc::clone(body)),
            Some(CacheEntry { preview, .. }) => CacheLookup::Pending {
                preview: preview.clone(),
            },
            None => CacheLookup::Unknown,
        }
    }

    /// Whether a rendered body is available for `id`.
    #[must_use]
    pub fn is_ready(&self, id: MessageId) -> bool {
        matches!(self.lookup(id), CacheLookup::Ready(_))
    }

    /// Number of entries with a rendered body.
    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.read().values().filter(|e| e.body.is_some()).count()
    }

    /// Drops every entry (view teardown).
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<MessageId, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<MessageId, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
