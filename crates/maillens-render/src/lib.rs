//! # maillens-render
//!
//! Async orchestration for rendering untrusted email HTML.
//!
//! This crate provides:
//! - **Render worker** - runs the `maillens-html` transform chain on the
//!   blocking pool, exclusive and coalescing per message id
//! - **Render cache** - per-thread map from message id to render state,
//!   readable synchronously from the UI thread
//! - **Scheduler** - selected-message-first render ordering for a thread,
//!   with completion events and a per-thread tracker report
//!
//! The pipeline has no hidden state: settings are passed explicitly into
//! every render, and the host learns about completed work through
//! [`RenderEvent`]s. Dropping the event receiver on view teardown discards
//! late results; cache writes are idempotent and keyed by id, so no
//! cancellation tokens are needed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod error;
pub mod model;
pub mod scheduler;
pub mod worker;

pub use cache::{CacheLookup, RenderCache, SKELETON_GRACE};
pub use error::{Error, Result};
pub use model::{MessageId, RenderEvent, RenderedBody, ThreadMessage};
pub use scheduler::ThreadScheduler;
pub use worker::{RenderWorker, render_body};

pub use maillens_html::{InlinePart, RenderSettings, TrackerReport};
