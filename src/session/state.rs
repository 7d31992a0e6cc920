//! View state of the scanner window

use crate::camera::CameraDevice;
use crate::capture::{PreviewFrame, ScannedCode};
use crate::error::ScanError;

/// Everything the scanner view renders
///
/// Transient and never persisted; owned by the controller.
#[derive(Debug, Default)]
pub struct ScannerState {
    /// Last decoded code
    pub result: Option<ScannedCode>,
    /// Whether a scan session is running
    pub scanning: bool,
    /// Whether a session is being opened
    pub starting: bool,
    /// The one error shown to the user
    pub error: Option<ScanError>,
    /// Cameras from the last enumeration
    pub cameras: Vec<CameraDevice>,
    /// `Camera n: label` for each entry of `cameras`
    pub camera_labels: Vec<String>,
    /// Index into `cameras` used by the next session
    pub selected_camera: Option<usize>,
    /// Latest frame of the running session
    pub preview: Option<PreviewFrame>,
}

impl ScannerState {
    /// Replace the camera list, keeping the preferred camera selected if present
    pub fn set_cameras(&mut self, cameras: Vec<CameraDevice>, preferred: Option<&str>) {
        self.camera_labels = cameras
            .iter()
            .enumerate()
            .map(|(i, c)| c.display_label(i))
            .collect();
        self.selected_camera = preferred
            .and_then(|id| cameras.iter().position(|c| c.id == id))
            .or(if cameras.is_empty() { None } else { Some(0) });
        self.cameras = cameras;
    }

    /// Device id of the selected camera
    pub fn selected_camera_id(&self) -> Option<&str> {
        self.selected_camera
            .and_then(|i| self.cameras.get(i))
            .map(|c| c.id.as_str())
    }

    /// Whether the camera is in use or being acquired
    pub fn is_active(&self) -> bool {
        self.scanning || self.starting
    }

    /// Text of the error banner
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}
