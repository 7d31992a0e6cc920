//! Camera frames as RGBA images

use image::RgbaImage;

/// Width of the preview surface in logical pixels
pub const PREVIEW_WIDTH: u32 = 360;

/// Height of the preview surface in logical pixels
pub const PREVIEW_HEIGHT: u32 = 250;

/// A camera frame ready for the preview surface
#[derive(Clone, Debug)]
pub struct PreviewFrame {
    pub width: u32,
    pub height: u32,
    pub handle: cosmic::widget::image::Handle,
}

impl PreviewFrame {
    /// Crop a camera frame to the preview aspect ratio and wrap it in a display handle
    pub fn new(frame: &RgbaImage, aspect_ratio: f32) -> Self {
        let (x, y, w, h) = aspect_crop(frame.width(), frame.height(), aspect_ratio);
        let rgba = image::imageops::crop_imm(frame, x, y, w, h).to_image();
        log::trace!(
            "Preview frame: {}x{} cropped to {}x{}",
            frame.width(),
            frame.height(),
            w,
            h
        );
        let (width, height) = rgba.dimensions();
        let handle = cosmic::widget::image::Handle::from_rgba(width, height, rgba.into_raw());
        Self {
            width,
            height,
            handle,
        }
    }
}

/// Camera pixels per preview pixel when a `width`x`height` region is shown
/// on the preview surface
///
/// The surface scales its content to fit, so the tighter axis decides.
pub fn preview_scale(width: u32, height: u32) -> f32 {
    let sx = width as f32 / PREVIEW_WIDTH as f32;
    let sy = height as f32 / PREVIEW_HEIGHT as f32;
    sx.max(sy)
}

/// Largest centered region of a `width`x`height` frame with the given aspect ratio
///
/// Returns (x, y, width, height). A non-positive ratio keeps the whole frame.
pub fn aspect_crop(width: u32, height: u32, aspect_ratio: f32) -> (u32, u32, u32, u32) {
    if width == 0 || height == 0 || !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return (0, 0, width, height);
    }

    let frame_ratio = width as f32 / height as f32;
    if frame_ratio > aspect_ratio {
        // Too wide: trim left and right
        let w = ((height as f32 * aspect_ratio).round() as u32).clamp(1, width);
        ((width - w) / 2, 0, w, height)
    } else {
        // Too tall: trim top and bottom
        let h = ((width as f32 / aspect_ratio).round() as u32).clamp(1, height);
        (0, (height - h) / 2, width, h)
    }
}

/// Copy a (possibly padded) RGBA plane into a tightly packed image
///
/// Returns None when the plane is too short for the given geometry.
pub fn rgba_from_plane(width: u32, height: u32, stride: usize, data: &[u8]) -> Option<RgbaImage> {
    let row_len = width as usize * 4;
    if stride < row_len {
        return None;
    }
    let needed = stride * (height as usize).saturating_sub(1) + row_len;
    if height == 0 || data.len() < needed {
        return None;
    }

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    RgbaImage::from_raw(width, height, pixels)
}
