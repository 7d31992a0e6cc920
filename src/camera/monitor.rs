//! GStreamer device monitor enumeration

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

use super::CameraDevice;

/// Device class reported by camera sources
const VIDEO_SOURCE_CLASS: &str = "Video/Source";

/// Property keys that identify a video device, most specific first
const ID_PROPERTIES: [&str; 4] = ["api.v4l2.path", "device.path", "object.path", "node.name"];

/// List the video input devices GStreamer can see
///
/// The same camera can be reported by more than one provider (v4l2 and
/// PipeWire); only the first entry per id is kept.
pub fn enumerate_devices() -> Result<Vec<(CameraDevice, gst::Device)>> {
    gst::init().context("Failed to initialize GStreamer")?;

    let monitor = gst::DeviceMonitor::new();
    monitor.add_filter(Some(VIDEO_SOURCE_CLASS), None);
    monitor
        .start()
        .context("Failed to start the video device monitor")?;
    let devices = monitor.devices();
    monitor.stop();

    let mut found: Vec<(CameraDevice, gst::Device)> = Vec::new();
    for (index, device) in devices.into_iter().enumerate() {
        let label = device.display_name().to_string();
        let id = device_id(&device).unwrap_or_else(|| format!("{}#{}", label, index));

        if found.iter().any(|(camera, _)| camera.id == id) {
            log::debug!("Skipping duplicate camera entry {}", id);
            continue;
        }

        log::debug!("Found camera {} ({})", label, id);
        found.push((CameraDevice { id, label }, device));
    }

    log::info!("Enumerated {} camera(s)", found.len());
    Ok(found)
}

fn device_id(device: &gst::Device) -> Option<String> {
    let props = device.properties()?;
    ID_PROPERTIES
        .iter()
        .find_map(|key| props.get::<String>(*key).ok())
        .filter(|id| !id.is_empty())
}

/// Devices from the last enumeration, keyed by camera id
///
/// Scan sessions look devices up here to build their source element.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, gst::Device>>,
}

impl DeviceRegistry {
    /// Re-enumerate and replace the registry contents
    pub fn refresh(&self) -> Result<Vec<CameraDevice>> {
        let found = enumerate_devices()?;
        let cameras = found.iter().map(|(camera, _)| camera.clone()).collect();

        let mut devices = self
            .devices
            .lock()
            .map_err(|_| anyhow::anyhow!("Camera registry lock poisoned"))?;
        devices.clear();
        devices.extend(found.into_iter().map(|(camera, device)| (camera.id, device)));

        Ok(cameras)
    }

    /// Create a source element for the camera with the given id
    pub fn create_source(&self, id: &str) -> Result<gst::Element> {
        let devices = self
            .devices
            .lock()
            .map_err(|_| anyhow::anyhow!("Camera registry lock poisoned"))?;
        let device = devices
            .get(id)
            .with_context(|| format!("Camera '{}' is no longer available", id))?;
        device
            .create_element(Some("camera-source"))
            .with_context(|| format!("Failed to open camera '{}'", id))
    }
}
