//! Render settings model.

/// Privacy and display preferences governing a single render.
///
/// Supplied by the host's settings store at render time; the pipeline never
/// stores a copy beyond comparing snapshots for cache invalidation. A
/// [`RenderedBody`](https://docs.rs/maillens-render) is only valid for the
/// settings it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Replace remote image references with an inert placeholder.
    pub block_remote_images: bool,
    /// Force-hide tiny or invisible images via document CSS, in addition to
    /// the always-on pixel stripper.
    pub block_tracking_pixels: bool,
    /// Remove known tracking parameters from link query strings.
    pub strip_tracking_parameters: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        // Privacy-first: every protection on until the user opts out.
        Self {
            block_remote_images: true,
            block_tracking_pixels: true,
            strip_tracking_parameters: true,
        }
    }
}
