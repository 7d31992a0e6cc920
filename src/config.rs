//! Configuration persistence for snapscan settings

use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};

use crate::fl;

/// Which decoder turns camera frames into codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecoderBackend {
    /// Pull RGBA frames from the camera and decode each one with rqrr
    #[default]
    Frame,
    /// Let the GStreamer zbar element scan the live video stream
    Stream,
}

impl DecoderBackend {
    pub const ALL: [DecoderBackend; 2] = [DecoderBackend::Frame, DecoderBackend::Stream];

    /// Short library name, used in logs and error messages
    pub fn library_name(self) -> &'static str {
        match self {
            DecoderBackend::Frame => "rqrr",
            DecoderBackend::Stream => "zbar",
        }
    }

    /// Localized label for the decoder selector
    pub fn label(self) -> String {
        match self {
            DecoderBackend::Frame => fl!("decoder-frame"),
            DecoderBackend::Stream => fl!("decoder-stream"),
        }
    }

    /// Position in [`DecoderBackend::ALL`]
    pub fn index(self) -> usize {
        match self {
            DecoderBackend::Frame => 0,
            DecoderBackend::Stream => 1,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CosmicConfigEntry)]
#[version = 1]
pub struct ScannerConfig {
    /// Decoder used for new scan sessions
    pub decoder: DecoderBackend,
    /// Frames per second delivered to the decoder and the preview
    pub fps: u32,
    /// Side length of the centered square the frame decoder looks at
    pub scan_box: u32,
    /// Preview aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Frames larger than this are downsampled before decoding (0 = never)
    #[serde(default = "default_max_decode_dim")]
    pub max_decode_dim: u32,
    /// Device id of the camera picked by the user
    #[serde(default)]
    pub preferred_camera: Option<String>,
    /// Copy every decoded result to the clipboard
    #[serde(default)]
    pub copy_on_scan: bool,
}

fn default_max_decode_dim() -> u32 {
    1024
}

impl ScannerConfig {
    /// Configuration ID for cosmic-config
    pub const ID: &'static str = "io.github.hojjatabdollahi.snapscan";

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => match Self::get_entry(&config) {
                Ok(entry) => entry,
                Err((errs, entry)) => {
                    log::warn!("Error loading config, using defaults: {:?}", errs);
                    entry
                }
            },
            Err(err) => {
                log::warn!("Could not create config handler: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => {
                if let Err(err) = self.write_entry(&config) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            Err(err) => {
                log::error!("Could not create config handler for saving: {:?}", err);
            }
        }
    }

    /// Options handed to the camera backend when a scan session starts
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            decoder: self.decoder,
            fps: self.fps.clamp(1, 60),
            scan_box: self.scan_box.max(64),
            aspect_ratio: if self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0 {
                self.aspect_ratio.clamp(0.25, 4.0)
            } else {
                1.0
            },
            max_decode_dim: self.max_decode_dim,
            preferred_camera: self.preferred_camera.clone(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderBackend::Frame,
            fps: 10,
            scan_box: 250,
            aspect_ratio: 1.0,
            max_decode_dim: default_max_decode_dim(),
            preferred_camera: None,
            copy_on_scan: false,
        }
    }
}

/// Sanitized per-session scan settings
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub decoder: DecoderBackend,
    pub fps: u32,
    pub scan_box: u32,
    pub aspect_ratio: f32,
    pub max_decode_dim: u32,
    pub preferred_camera: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScannerConfig::default().scan_options()
    }
}
