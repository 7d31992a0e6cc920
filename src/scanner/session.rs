//! GStreamer scan sessions
//!
//! One session owns one pipeline. Frames arrive on the appsink streaming
//! thread; bus messages (zbar results, errors, end of stream) are watched by
//! a dedicated thread that exits when the session stops.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use gstreamer_video::VideoFrameExt;
use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use super::pipeline::{ScanPipeline, make};
use super::{CameraBackend, ScanEvent, ScanEventKind, ScanHandle, ScanRequest, SessionId};
use crate::camera::{CameraDevice, CameraTarget, DeviceRegistry};
use crate::capture::image::rgba_from_plane;
use crate::capture::qr::decode_frame;
use crate::capture::{BarcodeFormat, PreviewFrame, ScannedCode};
use crate::config::DecoderBackend;
use crate::error::ScanError;

/// How often the bus thread checks for a stop request
const BUS_POLL_MS: u64 = 100;

/// Camera access through GStreamer
///
/// Clones share the device registry, so work can run on any thread.
#[derive(Clone, Default)]
pub struct GstBackend {
    registry: Arc<DeviceRegistry>,
}

impl CameraBackend for GstBackend {
    type Session = GstScanSession;

    fn probe(&self) -> Result<(), ScanError> {
        gst::init().map_err(|e| ScanError::MediaUnavailable(e.to_string()))
    }

    fn enumerate(&self) -> Result<Vec<CameraDevice>, ScanError> {
        self.registry
            .refresh()
            .map_err(|e| ScanError::CameraCheck(ScanError::describe(&e)))
    }

    fn decoder_available(&self, decoder: DecoderBackend) -> bool {
        super::decoder_available(decoder)
    }

    fn open(
        &self,
        request: ScanRequest,
        events: Sender<ScanEvent>,
    ) -> Result<GstScanSession, ScanError> {
        let source = match &request.camera {
            CameraTarget::Device(id) => self.registry.create_source(id),
            CameraTarget::Default => make("autovideosrc"),
        }
        .map_err(|e| ScanError::StartFailed(ScanError::describe(&e)))?;

        GstScanSession::start(source, &request, events)
            .map_err(|e| ScanError::StartFailed(ScanError::describe(&e)))
    }
}

/// A running camera pipeline
pub struct GstScanSession {
    id: SessionId,
    pipeline: Option<ScanPipeline>,
    stop_requested: Arc<AtomicBool>,
    bus_thread: Option<JoinHandle<()>>,
}

impl GstScanSession {
    fn start(source: gst::Element, request: &ScanRequest, events: Sender<ScanEvent>) -> Result<Self> {
        let id = request.session;
        let options = &request.options;
        log::info!(
            "Starting scan session {}: camera={:?}, decoder={}, fps={}",
            id,
            request.camera,
            options.decoder.library_name(),
            options.fps
        );

        let pipeline = ScanPipeline::new(source, options)?;

        // Only the first result of a session is reported
        let decoded = Arc::new(AtomicBool::new(false));
        let stop_requested = Arc::new(AtomicBool::new(false));

        install_frame_handler(
            pipeline.appsink(),
            FrameHandler {
                session: id,
                decode_frames: options.decoder == DecoderBackend::Frame,
                scan_box: options.scan_box,
                max_decode_dim: options.max_decode_dim,
                aspect_ratio: options.aspect_ratio,
                decoded: decoded.clone(),
                events: events.clone(),
            },
        );

        pipeline.start()?;

        let bus = pipeline.bus()?;
        let watcher = BusWatcher {
            session: id,
            report_barcodes: options.decoder == DecoderBackend::Stream,
            decoded,
            stop_requested: stop_requested.clone(),
            events,
        };
        let bus_thread = std::thread::Builder::new()
            .name(format!("scan-bus-{}", id.0))
            .spawn(move || watcher.run(bus))
            .context("Failed to spawn bus watcher thread")?;

        log::info!("Scan session {} started", id);
        Ok(Self {
            id,
            pipeline: Some(pipeline),
            stop_requested,
            bus_thread: Some(bus_thread),
        })
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop_requested.store(true, Ordering::Release);

        let result = match self.pipeline.take() {
            Some(pipeline) => pipeline.stop(),
            None => Ok(()),
        };

        if let Some(thread) = self.bus_thread.take() {
            if thread.join().is_err() {
                log::error!("Bus watcher of session {} panicked", self.id);
            }
        }

        result
    }
}

impl ScanHandle for GstScanSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn stop(&mut self) -> Result<(), ScanError> {
        log::info!("Stopping scan session {}", self.id);
        self.shutdown()
            .map_err(|e| ScanError::StopFailed(ScanError::describe(&e)))
    }
}

impl Drop for GstScanSession {
    fn drop(&mut self) {
        if self.pipeline.is_some() {
            log::info!("Releasing camera of dropped scan session {}", self.id);
            if let Err(e) = self.shutdown() {
                log::error!("Failed to release scan session {}: {:#}", self.id, e);
            }
        }
    }
}

/// State moved into the appsink callback
struct FrameHandler {
    session: SessionId,
    decode_frames: bool,
    scan_box: u32,
    max_decode_dim: u32,
    aspect_ratio: f32,
    decoded: Arc<AtomicBool>,
    events: Sender<ScanEvent>,
}

impl FrameHandler {
    fn handle(&self, frame: &RgbaImage) -> Result<(), crossbeam_channel::SendError<ScanEvent>> {
        if self.decode_frames && !self.decoded.load(Ordering::Acquire) {
            if let Some(code) = decode_frame(
                frame,
                self.scan_box,
                self.aspect_ratio,
                self.max_decode_dim,
            ) {
                if !self.decoded.swap(true, Ordering::AcqRel) {
                    log::info!("Session {}: decoded {} code", self.session, code.format);
                    self.events
                        .send(ScanEvent::new(self.session, ScanEventKind::Decoded(code)))?;
                }
            }
        }

        let preview = PreviewFrame::new(frame, self.aspect_ratio);
        self.events
            .send(ScanEvent::new(self.session, ScanEventKind::Preview(preview)))
    }
}

fn install_frame_handler(appsink: &gst_app::AppSink, handler: FrameHandler) {
    appsink.set_callbacks(
        gst_app::AppSinkCallbacks::builder()
            .new_sample(move |sink| {
                let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                let Some(frame) = sample_to_rgba(&sample) else {
                    log::warn!("Session {}: dropping unreadable frame", handler.session);
                    return Ok(gst::FlowSuccess::Ok);
                };

                // Receiver gone means the app is shutting down
                handler
                    .handle(&frame)
                    .map_err(|_| gst::FlowError::Flushing)?;
                Ok(gst::FlowSuccess::Ok)
            })
            .build(),
    );
}

/// Copy an RGBA sample out of GStreamer memory
fn sample_to_rgba(sample: &gst::Sample) -> Option<RgbaImage> {
    let buffer = sample.buffer()?;
    let caps = sample.caps()?;
    let info = gst_video::VideoInfo::from_caps(caps).ok()?;
    let frame = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info).ok()?;
    let stride = *frame.plane_stride().first()? as usize;
    let data = frame.plane_data(0).ok()?;
    rgba_from_plane(info.width(), info.height(), stride, data)
}

/// State moved into the bus thread
struct BusWatcher {
    session: SessionId,
    report_barcodes: bool,
    decoded: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
    events: Sender<ScanEvent>,
}

impl BusWatcher {
    fn run(self, bus: gst::Bus) {
        use gst::MessageView;

        while !self.stop_requested.load(Ordering::Acquire) {
            let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(BUS_POLL_MS)) else {
                continue;
            };

            match msg.view() {
                MessageView::Element(element) => {
                    if let Some(code) = element.structure().and_then(barcode_from_structure) {
                        self.report_barcode(code);
                    }
                }
                MessageView::Error(err) => {
                    let reason = match err.debug() {
                        Some(debug) => format!("{} ({})", err.error(), debug),
                        None => err.error().to_string(),
                    };
                    log::error!("Session {}: pipeline error: {}", self.session, reason);
                    self.send(ScanEventKind::Failed(err.error().to_string()));
                    self.send(ScanEventKind::Ended);
                    break;
                }
                MessageView::Warning(warning) => {
                    log::warn!("Session {}: pipeline warning: {}", self.session, warning.error());
                }
                MessageView::Eos(..) => {
                    log::info!("Session {}: camera stream ended", self.session);
                    self.send(ScanEventKind::Ended);
                    break;
                }
                _ => {}
            }
        }

        log::debug!("Bus watcher of session {} exiting", self.session);
    }

    fn report_barcode(&self, code: ScannedCode) {
        if !self.report_barcodes {
            return;
        }
        if self.decoded.swap(true, Ordering::AcqRel) {
            log::trace!("Session {}: ignoring repeated zbar result", self.session);
            return;
        }
        log::info!("Session {}: zbar decoded {} code", self.session, code.format);
        self.send(ScanEventKind::Decoded(code));
    }

    fn send(&self, kind: ScanEventKind) {
        if self.events.send(ScanEvent::new(self.session, kind)).is_err() {
            log::debug!("Session {}: event receiver closed", self.session);
        }
    }
}

/// Read a zbar `barcode` element message
fn barcode_from_structure(s: &gst::StructureRef) -> Option<ScannedCode> {
    if !s.has_name("barcode") {
        return None;
    }
    let symbol = s.get::<String>("symbol").ok()?;
    let format = s
        .get::<String>("type")
        .map(|t| BarcodeFormat::from_zbar(&t))
        .unwrap_or(BarcodeFormat::Unknown);
    Some(ScannedCode::new(symbol, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barcode_from_structure() {
        if gst::init().is_err() {
            return;
        }
        let s = gst::Structure::builder("barcode")
            .field("type", "EAN-13")
            .field("symbol", "4006381333931")
            .field("quality", 1i32)
            .build();
        let code = barcode_from_structure(&s).unwrap();
        assert_eq!(code.text, "4006381333931");
        assert_eq!(code.format, BarcodeFormat::Ean13);
    }

    #[test]
    fn test_barcode_without_type_is_unknown() {
        if gst::init().is_err() {
            return;
        }
        let s = gst::Structure::builder("barcode")
            .field("symbol", "hello")
            .build();
        let code = barcode_from_structure(&s).unwrap();
        assert_eq!(code.format, BarcodeFormat::Unknown);
    }

    #[test]
    fn test_other_element_messages_are_ignored() {
        if gst::init().is_err() {
            return;
        }
        let s = gst::Structure::builder("level")
            .field("symbol", "hello")
            .build();
        assert!(barcode_from_structure(&s).is_none());
    }

    #[test]
    fn test_frame_handler_reports_preview_once_per_frame() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handler = FrameHandler {
            session: SessionId(7),
            decode_frames: true,
            scan_box: 250,
            max_decode_dim: 1024,
            aspect_ratio: 1.0,
            decoded: Arc::new(AtomicBool::new(false)),
            events: tx,
        };
        let frame = RgbaImage::from_pixel(64, 48, image::Rgba([255, 255, 255, 255]));
        handler.handle(&frame).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.session, SessionId(7));
        match event.kind {
            ScanEventKind::Preview(preview) => assert_eq!(preview.width, 48),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
