use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::core::{Frame, GymError, RenderFrame, Result};

/// Encode a `RenderFrame::Pixels` (RGB or RGBA) as PNG bytes.
pub fn encode_png(frame: &RenderFrame) -> Result<Vec<u8>> {
    match frame {
        RenderFrame::Pixels { width, height, data } => {
            let count = (*width as usize) * (*height as usize);
            let color = if data.len() == count * 3 {
                ExtendedColorType::Rgb8
            } else if data.len() == count * 4 {
                ExtendedColorType::Rgba8
            } else {
                return Err(GymError::InvalidObservation(format!(
                    "Pixel data length {} does not match width*height*3 or *4 ({}x{})",
                    data.len(), width, height
                )));
            };
            write_png(data, *width, *height, color)
        }
        RenderFrame::Text(_) => Err(GymError::NotSupported("Text frames cannot be encoded to PNG".into())),
    }
}

/// Save a `RenderFrame::Pixels` as a PNG file.
pub fn save_png<P: AsRef<std::path::Path>>(path: P, frame: &RenderFrame) -> Result<()> {
    let bytes = encode_png(frame)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode one processed `(1, h, w)` frame as an 8-bit grayscale PNG.
///
/// Values are min-max scaled to 0..255 so normalized frames stay visible;
/// a constant frame becomes black.
pub fn frame_to_png(frame: &Frame) -> Result<Vec<u8>> {
    let (channels, h, w) = frame.dim();
    if channels != 1 {
        return Err(GymError::InvalidObservation(format!(
            "expected a single-channel frame, got {channels} channels"
        )));
    }
    let gray = frame_to_gray8(frame.iter().copied());
    write_png(&gray, w as u32, h as u32, ExtendedColorType::L8)
}

pub fn save_frame_png<P: AsRef<std::path::Path>>(path: P, frame: &Frame) -> Result<()> {
    let bytes = frame_to_png(frame)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Min-max scale arbitrary float pixels into bytes.
pub fn frame_to_gray8<I>(values: I) -> Vec<u8>
where
    I: Iterator<Item = f32> + Clone,
{
    let (lo, hi) = values.clone().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    values
        .map(|v| if span > 0.0 { ((v - lo) / span * 255.0).round() as u8 } else { 0 })
        .collect()
}

fn write_png(pixels: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(pixels, width, height, color)?;
    Ok(buf)
}
