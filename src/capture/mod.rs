//! Frame capture and decoding module
//!
//! This module consolidates:
//! - Decoded code and symbology types (format.rs)
//! - QR code decoding of single frames with rqrr (qr.rs)
//! - Preview frames shown while scanning (image.rs)

pub mod format;
pub mod image;
pub mod qr;

pub use format::{BarcodeFormat, ScannedCode};
pub use image::PreviewFrame;
