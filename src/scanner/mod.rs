//! Scan sessions: camera acquisition plus decoding
//!
//! A backend opens one camera, runs one of the two decoders on it and reports
//! what happens as [`ScanEvent`]s on a channel. The GStreamer implementation
//! lives in session.rs; pipeline.rs builds the element graph and decoder.rs
//! checks which decoders can be loaded.

pub mod decoder;
mod pipeline;
mod session;

pub use decoder::{DecoderInfo, decoder_available, detect_decoders};
pub use session::{GstBackend, GstScanSession};

use crossbeam_channel::Sender;

use crate::camera::{CameraDevice, CameraTarget};
use crate::capture::{PreviewFrame, ScannedCode};
use crate::config::{DecoderBackend, ScanOptions};
use crate::error::ScanError;

/// Identifies one scan session; events from older sessions are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened in a running scan session
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub session: SessionId,
    pub kind: ScanEventKind,
}

#[derive(Debug, Clone)]
pub enum ScanEventKind {
    /// A new frame for the preview surface
    Preview(PreviewFrame),
    /// The decoder found a code
    Decoded(ScannedCode),
    /// The pipeline reported an error
    Failed(String),
    /// The pipeline stopped on its own (end of stream or fatal error)
    Ended,
}

impl ScanEvent {
    pub fn new(session: SessionId, kind: ScanEventKind) -> Self {
        Self { session, kind }
    }
}

/// Everything a backend needs to open a session
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub session: SessionId,
    pub camera: CameraTarget,
    pub options: ScanOptions,
}

/// Platform camera access
pub trait CameraBackend {
    type Session: ScanHandle;

    /// Check that the media layer can be used at all
    fn probe(&self) -> Result<(), ScanError>;

    /// List the video input devices
    fn enumerate(&self) -> Result<Vec<CameraDevice>, ScanError>;

    /// Whether the given decoder can be loaded
    fn decoder_available(&self, decoder: DecoderBackend) -> bool;

    /// Acquire the camera and start decoding; events go to `events`
    fn open(
        &self,
        request: ScanRequest,
        events: Sender<ScanEvent>,
    ) -> Result<Self::Session, ScanError>;
}

/// A running scan session; dropping it releases the camera
pub trait ScanHandle {
    fn id(&self) -> SessionId;

    /// Release the camera and reset decoder state
    fn stop(&mut self) -> Result<(), ScanError>;
}
