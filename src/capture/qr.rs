//! QR code decoding of single camera frames using rqrr

use image::RgbaImage;

use super::format::{BarcodeFormat, ScannedCode};
use super::image::{aspect_crop, preview_scale};

/// Centered square region of a frame that the decoder looks at
///
/// `scan_box` is measured on the preview surface, not in camera pixels: the
/// frame is cropped to `aspect_ratio` for display and scaled to fit the
/// surface, so the box is scaled the same way before it is clamped to the
/// visible region. Returns (x, y, width, height) in frame pixels.
pub fn scan_region(
    width: u32,
    height: u32,
    scan_box: u32,
    aspect_ratio: f32,
) -> (u32, u32, u32, u32) {
    let (vx, vy, vw, vh) = aspect_crop(width, height, aspect_ratio);
    if scan_box == 0 || vw == 0 || vh == 0 {
        return (vx, vy, vw, vh);
    }
    let scaled = (scan_box as f32 * preview_scale(vw, vh)).round() as u32;
    let side = scaled.clamp(1, vw.min(vh));
    (vx + (vw - side) / 2, vy + (vh - side) / 2, side, side)
}

/// Factor by which a `width`x`height` image is shrunk to fit in `max_dim`
/// max_dim: maximum dimension to downsample to (0 = no downsampling)
pub fn downsample_factor(width: u32, height: u32, max_dim: u32) -> f32 {
    if max_dim > 0 && (width > max_dim || height > max_dim) {
        width.max(height) as f32 / max_dim as f32
    } else {
        1.0
    }
}

/// Decode the first QR code inside the scan box of a frame
pub fn decode_frame(
    frame: &RgbaImage,
    scan_box: u32,
    aspect_ratio: f32,
    max_dim: u32,
) -> Option<ScannedCode> {
    use rqrr::PreparedImage;

    let (x, y, w, h) = scan_region(frame.width(), frame.height(), scan_box, aspect_ratio);
    if w == 0 || h == 0 {
        return None;
    }
    let region = image::imageops::crop_imm(frame, x, y, w, h).to_image();

    let factor = downsample_factor(w, h, max_dim);
    let gray = if factor > 1.0 {
        let new_w = ((w as f32 / factor) as u32).max(1);
        let new_h = ((h as f32 / factor) as u32).max(1);
        let resized =
            image::imageops::resize(&region, new_w, new_h, image::imageops::FilterType::Nearest);
        image::DynamicImage::ImageRgba8(resized).to_luma8()
    } else {
        image::DynamicImage::ImageRgba8(region).to_luma8()
    };

    let mut prepared = PreparedImage::prepare(gray);
    let grids = prepared.detect_grids();
    log::trace!("rqrr found {} candidate grid(s)", grids.len());

    for grid in grids {
        match grid.decode() {
            Ok((meta, content)) => {
                log::debug!(
                    "Decoded QR code (version {}, ecc level {})",
                    meta.version.0,
                    meta.ecc_level
                );
                return Some(ScannedCode::new(content, BarcodeFormat::QrCode));
            }
            Err(e) => log::trace!("Grid failed to decode: {}", e),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com";

    /// White frame with a QR code of roughly `code_px` pixels (quiet zone
    /// included) centered in it
    fn frame_with_code(width: u32, height: u32, text: &str, code_px: u32) -> RgbaImage {
        let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let quiet = 4;
        let module_px = (code_px / (modules + 2 * quiet)).max(1);
        let side = (modules + 2 * quiet) * module_px;
        let (ox, oy) = ((width - side) / 2, (height - side) / 2);

        let mut frame = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        for my in 0..modules {
            for mx in 0..modules {
                if colors[(my * modules + mx) as usize] != qrcode::Color::Dark {
                    continue;
                }
                let px = ox + (mx + quiet) * module_px;
                let py = oy + (my + quiet) * module_px;
                for y in py..py + module_px {
                    for x in px..px + module_px {
                        frame.put_pixel(x, y, image::Rgba([0, 0, 0, 255]));
                    }
                }
            }
        }
        frame
    }

    #[test]
    fn test_scan_region_fills_square_preview() {
        // 480 px visible square shown 250 px tall: the default box covers it
        assert_eq!(scan_region(640, 480, 250, 1.0), (80, 0, 480, 480));
    }

    #[test]
    fn test_scan_region_scales_with_frame_size() {
        // 720 px square on a 250 px surface: 125 preview px is 360 camera px
        assert_eq!(scan_region(1280, 720, 125, 1.0), (460, 180, 360, 360));
    }

    #[test]
    fn test_scan_region_small_frame() {
        // 120 px visible square is scaled up on screen, so the box shrinks
        assert_eq!(scan_region(200, 120, 125, 1.0), (70, 30, 60, 60));
    }

    #[test]
    fn test_scan_region_zero_means_visible_region() {
        assert_eq!(scan_region(320, 240, 0, 1.0), (40, 0, 240, 240));
    }

    #[test]
    fn test_downsample_factor() {
        assert_eq!(downsample_factor(2048, 1024, 1024), 2.0);
        assert_eq!(downsample_factor(800, 600, 1024), 1.0);
        assert_eq!(downsample_factor(4096, 4096, 0), 1.0);
    }

    #[test]
    fn test_decode_code_inside_box() {
        let frame = frame_with_code(640, 480, URL, 198);
        let code = decode_frame(&frame, 250, 1.0, 1024).unwrap();
        assert_eq!(code.text, URL);
        assert_eq!(code.format.label(), "QR_CODE");
    }

    #[test]
    fn test_decode_code_filling_hd_preview() {
        let frame = frame_with_code(1280, 720, URL, 495);
        let code = decode_frame(&frame, 250, 1.0, 1024).unwrap();
        assert_eq!(code.text, URL);

        let frame = frame_with_code(1920, 1080, URL, 693);
        let code = decode_frame(&frame, 250, 1.0, 1024).unwrap();
        assert_eq!(code.text, URL);
    }

    #[test]
    fn test_decode_blank_frame_finds_nothing() {
        let frame = RgbaImage::from_pixel(320, 240, image::Rgba([255, 255, 255, 255]));
        assert!(decode_frame(&frame, 250, 1.0, 1024).is_none());
    }

    #[test]
    fn test_decode_empty_frame_finds_nothing() {
        let frame = RgbaImage::new(0, 0);
        assert!(decode_frame(&frame, 250, 1.0, 1024).is_none());
    }
}
