//! Styled-document assembly.
//!
//! Wraps a fully transformed body into one self-contained HTML document:
//! viewport pinned to the container, embedded CSS, and a
//! Content-Security-Policy reflecting the active settings. The CSP is the
//! hard guarantee of the pipeline: `script-src` is never granted, so nothing
//! executes even if a sanitizer pattern was defeated.

use std::fmt::Write as _;

use crate::settings::RenderSettings;

/// Base stylesheet embedded in every document.
const BASE_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; }
html, body { margin: 0; padding: 0; width: 100%; overflow-x: hidden; }
body {
  font-family: -apple-system, "Segoe UI", Roboto, sans-serif;
  font-size: 15px;
  line-height: 1.5;
  word-wrap: break-word;
}
img, video, iframe, canvas { max-width: 100% !important; height: auto; }
table { max-width: 100%; border-collapse: collapse; }
td, th { word-break: break-word; }
blockquote {
  margin: 8px 0 8px 4px;
  padding-left: 12px;
  border-left: 3px solid #d0d0d0;
  color: #555555;
}
pre, code {
  background: #f4f4f4;
  border-radius: 4px;
  padding: 2px 4px;
  overflow-x: auto;
  max-width: 100%;
}
@media (prefers-color-scheme: dark) {
  blockquote { border-left-color: #555555; color: #aaaaaa; }
  pre, code { background: #2a2a2a; }
}
.form-disabled { border: 1px dashed #c0c0c0; padding: 8px; }
img[data-blocked-src] { width: 0 !important; height: 0 !important; }
"#;

/// Second line of defense behind the pixel stripper, included only when
/// `block_tracking_pixels` is enabled.
const PIXEL_BLOCK_CSS: &str = r#"
img[width="0"], img[height="0"], img[width="1"], img[height="1"],
img[style*="display:none"], img[style*="display: none"] {
  display: none !important;
}
"#;

/// Builds the complete display document for a transformed body.
///
/// The body is embedded verbatim; every transform must already have run.
/// `img-src`/`font-src` admit `https:` exactly when remote images are
/// allowed; `data:` is always admitted (placeholders, resolved `cid:`
/// parts). User zoom is disabled so the host surface owns scaling.
#[must_use]
pub fn build_document(body: &str, settings: RenderSettings) -> String {
    let resource_src = if settings.block_remote_images {
        "data:"
    } else {
        "data: https:"
    };

    let mut doc = String::with_capacity(body.len() + 2048);
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no\">\n",
    );
    let _ = writeln!(
        doc,
        "<meta http-equiv=\"Content-Security-Policy\" content=\"default-src 'none'; style-src 'unsafe-inline'; img-src {resource_src}; font-src {resource_src}\">",
    );
    doc.push_str("<style>");
    doc.push_str(BASE_CSS);
    if settings.block_tracking_pixels {
        doc.push_str(PIXEL_BLOCK_CSS);
    }
    doc.push_str("</style>\n</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("\n</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_embedded_verbatim() {
        let body = "<p>Hello &amp; welcome</p>";
        let doc = build_document(body, RenderSettings::default());
        assert!(doc.contains(body));
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_csp_never_grants_script() {
        for settings in [
            RenderSettings::default(),
            RenderSettings {
                block_remote_images: false,
                block_tracking_pixels: false,
                strip_tracking_parameters: false,
            },
        ] {
            let doc = build_document("x", settings);
            assert!(doc.contains("default-src 'none'"));
            assert!(!doc.contains("script-src"));
        }
    }

    #[test]
    fn test_img_src_tracks_remote_image_setting() {
        let blocked = build_document("x", RenderSettings::default());
        assert!(blocked.contains("img-src data:;"));
        assert!(!blocked.contains("img-src data: https:"));

        let allowed = build_document(
            "x",
            RenderSettings {
                block_remote_images: false,
                ..RenderSettings::default()
            },
        );
        assert!(allowed.contains("img-src data: https:;"));
    }

    #[test]
    fn test_pixel_css_conditional() {
        let on = build_document("x", RenderSettings::default());
        assert!(on.contains(r#"img[width="1"]"#));

        let off = build_document(
            "x",
            RenderSettings {
                block_tracking_pixels: false,
                ..RenderSettings::default()
            },
        );
        assert!(!off.contains(r#"img[width="1"]"#));
    }

    #[test]
    fn test_viewport_disables_zoom() {
        let doc = build_document("x", RenderSettings::default());
        assert!(doc.contains("user-scalable=no"));
    }
}
