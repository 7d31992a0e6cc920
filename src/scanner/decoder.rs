//! Decoder availability detection
//!
//! Queries GStreamer for the elements each decoder needs

use anyhow::{Context, Result};
use gstreamer as gst;

use crate::config::DecoderBackend;
use crate::fl;

/// Elements every scan pipeline is built from
const BASE_ELEMENTS: [&str; 4] = ["videoconvert", "videoscale", "videorate", "appsink"];

/// Element that scans the stream for the `Stream` decoder
pub const ZBAR_ELEMENT: &str = "zbar";

/// Information about a decoder and whether it can be used here
#[derive(Debug, Clone)]
pub struct DecoderInfo {
    pub backend: DecoderBackend,
    /// Human-readable name (e.g., "zbar video stream")
    pub name: String,
    /// GStreamer element the decoder depends on, if any
    pub gst_element: Option<String>,
    pub available: bool,
}

impl DecoderInfo {
    /// Display name with availability indicator
    pub fn display_name(&self) -> String {
        if self.available {
            self.name.clone()
        } else {
            format!("{} {}", self.name, fl!("decoder-not-installed"))
        }
    }
}

/// Detect which decoders can be used
pub fn detect_decoders() -> Result<Vec<DecoderInfo>> {
    gst::init().context("Failed to initialize GStreamer")?;

    let base = BASE_ELEMENTS.iter().all(|e| element_available(e));

    Ok(vec![
        DecoderInfo {
            backend: DecoderBackend::Frame,
            name: "rqrr image frames".to_string(),
            gst_element: None,
            available: base,
        },
        DecoderInfo {
            backend: DecoderBackend::Stream,
            name: "zbar video stream".to_string(),
            gst_element: Some(ZBAR_ELEMENT.to_string()),
            available: base && element_available(ZBAR_ELEMENT),
        },
    ])
}

/// Check a single decoder
pub fn decoder_available(backend: DecoderBackend) -> bool {
    match detect_decoders() {
        Ok(decoders) => decoders
            .iter()
            .any(|d| d.backend == backend && d.available),
        Err(e) => {
            log::error!("Failed to detect decoders: {:#}", e);
            false
        }
    }
}

/// Check if a GStreamer element is available
fn element_available(element_name: &str) -> bool {
    gst::ElementFactory::find(element_name).is_some()
}
