//! Camera device model and enumeration
//!
//! This module contains:
//! - The camera device description shown to the user
//! - The camera target a scan session opens
//! - GStreamer device monitor enumeration (monitor.rs)

mod monitor;

pub use monitor::DeviceRegistry;

use crate::fl;

/// A video input device available on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Stable device identifier (device path or node name)
    pub id: String,
    /// Human readable name reported by the platform, may be empty
    pub label: String,
}

impl CameraDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Label for the camera list, `index` is zero-based
    pub fn display_label(&self, index: usize) -> String {
        let label = if self.label.trim().is_empty() {
            fl!("unnamed-camera")
        } else {
            self.label.clone()
        };
        fl!("camera-entry", index = (index + 1), label = label)
    }
}

/// Which camera a scan session should open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraTarget {
    /// A device returned by enumeration
    Device(String),
    /// Whatever camera the platform picks by default
    Default,
}

impl CameraTarget {
    /// Pick the preferred camera if it is present, otherwise the first one
    pub fn choose(cameras: &[CameraDevice], preferred: Option<&str>) -> Self {
        preferred
            .and_then(|id| cameras.iter().find(|c| c.id == id))
            .or_else(|| cameras.first())
            .map(|c| CameraTarget::Device(c.id.clone()))
            .unwrap_or(CameraTarget::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cameras() -> Vec<CameraDevice> {
        vec![
            CameraDevice::new("/dev/video0", "Integrated Webcam"),
            CameraDevice::new("/dev/video2", ""),
        ]
    }

    #[test]
    fn test_display_label_numbers_from_one() {
        let cams = cameras();
        assert_eq!(cams[0].display_label(0), "Camera 1: Integrated Webcam");
    }

    #[test]
    fn test_display_label_unnamed_fallback() {
        let cams = cameras();
        assert_eq!(cams[1].display_label(1), "Camera 2: Unnamed Camera");
    }

    #[test]
    fn test_choose_prefers_configured_camera() {
        let target = CameraTarget::choose(&cameras(), Some("/dev/video2"));
        assert_eq!(target, CameraTarget::Device("/dev/video2".to_string()));
    }

    #[test]
    fn test_choose_falls_back_to_first_camera() {
        let target = CameraTarget::choose(&cameras(), Some("/dev/video9"));
        assert_eq!(target, CameraTarget::Device("/dev/video0".to_string()));

        let target = CameraTarget::choose(&cameras(), None);
        assert_eq!(target, CameraTarget::Device("/dev/video0".to_string()));
    }

    #[test]
    fn test_choose_default_without_cameras() {
        assert_eq!(CameraTarget::choose(&[], None), CameraTarget::Default);
    }
}
