//! Message types for the scanner window

use super::controller::{Done, Handoff};
use crate::scanner::{DecoderInfo, GstScanSession, ScanEvent};

#[derive(Debug, Clone)]
pub enum Msg {
    /// Start Scanning button
    Start,
    /// Stop Scanning button
    Stop,
    /// Event from the running scan session
    Scan(ScanEvent),
    /// Re-enumerate cameras
    RefreshCameras,
    /// Blocking camera work finished
    WorkDone(Handoff<Done<GstScanSession>>),
    /// Decoder plugins checked at start-up
    DecodersDetected(Vec<DecoderInfo>),
    /// Camera picked in the selector (index into the camera list)
    SelectCamera(usize),
    /// Decoder picked in the selector (index into `DecoderBackend::ALL`)
    SelectDecoder(usize),
    /// Toggle copying every result to the clipboard
    CopyOnScan(bool),
    /// Copy the current result to the clipboard
    CopyResult,
    /// Dismiss the result card
    ClearResult,
}
