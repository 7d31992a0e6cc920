//! GStreamer pipeline construction and management

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;

use super::decoder::ZBAR_ELEMENT;
use crate::config::{DecoderBackend, ScanOptions};

/// How long a camera may take to reach the playing state
const START_TIMEOUT_SECS: u64 = 5;

/// GStreamer pipeline from a camera source to an RGBA appsink
///
/// The `Frame` decoder reads the appsink frames; the `Stream` decoder adds a
/// zbar element in front of it that posts `barcode` messages on the bus.
pub struct ScanPipeline {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
}

impl ScanPipeline {
    /// Create a new scan pipeline
    ///
    /// # Arguments
    /// * `source` - Camera source element
    /// * `options` - Decoder and frame rate to use
    pub fn new(source: gst::Element, options: &ScanOptions) -> Result<Self> {
        gst::init().context("Failed to initialize GStreamer")?;

        let pipeline = gst::Pipeline::new();

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .field("framerate", gst::Fraction::new(options.fps as i32, 1))
            .build();

        let appsink = gst_app::AppSink::builder()
            .name("frame-sink")
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .sync(false)
            .build();

        let mut elements = vec![source, make("videoconvert")?];

        if options.decoder == DecoderBackend::Stream {
            let zbar = gst::ElementFactory::make(ZBAR_ELEMENT)
                .property("cache", true)
                .build()
                .context("Failed to create zbar element. Is gst-plugins-bad installed?")?;
            elements.push(zbar);
            elements.push(make("videoconvert")?);
        }

        elements.push(make("videoscale")?);
        elements.push(make("videorate")?);
        elements.push(appsink.clone().upcast());

        // Add elements to pipeline
        pipeline.add_many(&elements)?;

        // Link elements
        gst::Element::link_many(&elements).context("Failed to link scan pipeline")?;

        log::debug!(
            "Created {} scan pipeline at {} fps",
            options.decoder.library_name(),
            options.fps
        );

        Ok(Self { pipeline, appsink })
    }

    /// Sink the frame callbacks are installed on
    pub fn appsink(&self) -> &gst_app::AppSink {
        &self.appsink
    }

    pub fn bus(&self) -> Result<gst::Bus> {
        self.pipeline.bus().context("Pipeline has no bus")
    }

    /// Start the pipeline and wait for the camera to come up
    pub fn start(&self) -> Result<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|_| self.pending_error("Failed to start pipeline"))?;

        let (result, current, _pending) = self
            .pipeline
            .state(gst::ClockTime::from_seconds(START_TIMEOUT_SECS));
        result.map_err(|_| self.pending_error("Camera did not start"))?;

        log::debug!("Scan pipeline state: {:?}", current);
        Ok(())
    }

    /// Stop the pipeline and release the camera
    pub fn stop(&self) -> Result<()> {
        self.pipeline
            .set_state(gst::State::Null)
            .context("Failed to stop pipeline")?;
        Ok(())
    }

    /// Turn the first error waiting on the bus into the failure reason
    fn pending_error(&self, what: &str) -> anyhow::Error {
        let detail = self
            .pipeline
            .bus()
            .and_then(|bus| bus.pop_filtered(&[gst::MessageType::Error]))
            .and_then(|msg| match msg.view() {
                gst::MessageView::Error(err) => Some(err.error().to_string()),
                _ => None,
            });

        match detail {
            Some(detail) => anyhow::anyhow!("{}: {}", what, detail),
            None => anyhow::anyhow!("{}", what),
        }
    }
}

impl Drop for ScanPipeline {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            log::error!("Failed to release scan pipeline: {}", e);
        }
    }
}

/// Create a plain element by factory name
pub fn make(factory: &str) -> Result<gst::Element> {
    gst::ElementFactory::make(factory)
        .build()
        .with_context(|| format!("Failed to create {} element", factory))
}
