use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma, Rgb};
use ndarray::{s, Array3, Axis};

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{Result, VidmagError};
use crate::frame::Frame;
use crate::roi::Rect;

/// Load an image file as a 3-channel RGB frame with values in [0, 1].
pub fn load_color_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let rgb = img.to_rgb16();
    let (w, h) = rgb.dimensions();
    let mut data = Array3::<f32>::zeros((h as usize, w as usize, 3));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            data[[y as usize, x as usize, c]] = pixel.0[c] as f32 / 65535.0;
        }
    }

    Ok(Frame::new(data))
}

fn invalid_dimensions(frame: &Frame) -> VidmagError {
    VidmagError::InvalidDimensions {
        width: frame.width(),
        height: frame.height(),
        channels: frame.channels(),
    }
}

/// Save a 1- or 3-channel frame as 16-bit TIFF.
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();

    match frame.channels() {
        1 => ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .ok_or_else(|| invalid_dimensions(frame))?
            .save_with_format(path, ImageFormat::Tiff)?,
        3 => ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .ok_or_else(|| invalid_dimensions(frame))?
            .save_with_format(path, ImageFormat::Tiff)?,
        _ => return Err(invalid_dimensions(frame)),
    }
    Ok(())
}

/// Save a 1- or 3-channel frame as 8-bit PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let pixels: Vec<u8> = frame
        .data
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    match frame.channels() {
        1 => ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .ok_or_else(|| invalid_dimensions(frame))?
            .save_with_format(path, ImageFormat::Png)?,
        3 => ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .ok_or_else(|| invalid_dimensions(frame))?
            .save_with_format(path, ImageFormat::Png)?,
        _ => return Err(invalid_dimensions(frame)),
    }
    Ok(())
}

/// Save a frame, choosing format from the file extension (TIFF otherwise).
pub fn save_frame_image(frame: &Frame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(frame, path),
        _ => save_tiff(frame, path),
    }
}

/// Draw a one-pixel rectangle outline in `color` onto `frame`.
///
/// Single-channel frames receive the color's luminance.
pub fn draw_rect(frame: &mut Frame, rect: &Rect, color: [u8; 3]) {
    let rect = rect.clamp_to(frame.width(), frame.height());
    if rect.is_empty() {
        return;
    }
    let value: Vec<f32> = match frame.channels() {
        3 => color.iter().map(|&c| c as f32 / 255.0).collect(),
        n => {
            let [r, g, b] = color.map(|c| c as f32 / 255.0);
            vec![LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b; n]
        }
    };

    let (top, bottom) = (rect.y, rect.bottom() - 1);
    let (left, right) = (rect.x, rect.right() - 1);
    let mut paint = |rows: std::ops::RangeInclusive<usize>, cols: std::ops::RangeInclusive<usize>| {
        let mut edge = frame.data.slice_mut(s![rows, cols, ..]);
        for mut pixel in edge.lanes_mut(Axis(2)) {
            for (dst, &src) in pixel.iter_mut().zip(&value) {
                *dst = src;
            }
        }
    };
    paint(top..=top, left..=right);
    paint(bottom..=bottom, left..=right);
    paint(top..=bottom, left..=left);
    paint(top..=bottom, right..=right);
}
