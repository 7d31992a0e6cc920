//! User-visible scanner errors
//!
//! Every failure ends up as exactly one of these, shown in the error banner.
//! The Display text is the localized message the user reads.

use std::fmt;

use thiserror::Error;

use crate::fl;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The platform media layer (GStreamer) could not be initialized
    MediaUnavailable(String),

    /// Enumeration worked but returned no video input
    NoCameras,

    /// Enumeration itself failed
    CameraCheck(String),

    /// The configured decoder library cannot be loaded
    DecoderUnavailable(&'static str),

    /// Opening the camera or starting the decoder failed
    StartFailed(String),

    /// Releasing the camera failed
    StopFailed(String),

    /// The running session reported a failure
    Scan(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ScanError::MediaUnavailable(reason) => {
                fl!("error-media-unavailable", reason = reason.as_str())
            }
            ScanError::NoCameras => fl!("error-no-cameras"),
            ScanError::CameraCheck(reason) => fl!("error-camera-check", reason = reason.as_str()),
            ScanError::DecoderUnavailable(decoder) => {
                fl!("error-decoder-unavailable", decoder = (*decoder))
            }
            ScanError::StartFailed(reason) => fl!("error-start-failed", reason = reason.as_str()),
            ScanError::StopFailed(reason) => fl!("error-stop-failed", reason = reason.as_str()),
            ScanError::Scan(reason) => fl!("error-scan", reason = reason.as_str()),
        };
        f.write_str(&message)
    }
}

impl ScanError {
    /// Flatten an anyhow chain into a single line
    pub fn describe(err: &anyhow::Error) -> String {
        format!("{:#}", err)
    }
}
