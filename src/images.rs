use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use log::debug;
use std::io::Cursor;

use crate::PipelineError;

/// Side length of the square input most pretrained classifiers
/// (MobileNetV2 and friends) expect
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Represents the source of an image for classification
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image from a file path
    Path(String),
    /// Encoded image bytes (JPEG, PNG, ...)
    Bytes(Vec<u8>),
    /// Image as base64-encoded data
    Base64(String),
}

/// Decoded RGB8 pixels in the layout the classifier consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height * 3` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Encode the buffer as PNG, for models that take an encoded image
    pub fn to_png(&self) -> Result<Vec<u8>, PipelineError> {
        let rgb = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| {
                PipelineError::ImageConversion(format!(
                    "buffer of {} bytes does not match {}x{} RGB",
                    self.data.len(),
                    self.width,
                    self.height
                ))
            })?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb).write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// [`PixelBuffer::to_png`] on the blocking pool
    pub async fn encode_png(&self) -> Result<Vec<u8>, PipelineError> {
        let pixels = self.clone();
        tokio::task::spawn_blocking(move || pixels.to_png())
            .await
            .map_err(|e| PipelineError::ImageConversion(format!("Task join error: {}", e)))?
    }
}

/// Read the raw encoded bytes behind an image source
pub async fn read_source(source: &ImageSource) -> Result<Vec<u8>, PipelineError> {
    match source {
        ImageSource::Path(path) => Ok(tokio::fs::read(path).await?),
        ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        ImageSource::Base64(data) => STANDARD
            .decode(data.trim())
            .map_err(|e| PipelineError::ImageConversion(format!("invalid base64: {}", e))),
    }
}

/// Decode encoded image bytes and convert them to a square RGB buffer
///
/// The image is resized to exactly `size` x `size` pixels, ignoring aspect
/// ratio, which is how classifier inputs are usually prepared.
///
/// # Errors
/// Returns an error if:
/// - The bytes are empty
/// - The bytes are not a decodable image
/// - `size` is zero
pub fn to_pixel_buffer(bytes: &[u8], size: u32) -> Result<PixelBuffer, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::ImageConversion("image is empty".to_string()));
    }
    if size == 0 {
        return Err(PipelineError::ImageConversion(
            "target size must be non-zero".to_string(),
        ));
    }

    let img = image::load_from_memory(bytes)?;
    debug!(
        "Decoded {}x{} image, resizing to {}x{}",
        img.width(),
        img.height(),
        size,
        size
    );

    let rgb = img.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    Ok(PixelBuffer {
        width: rgb.width(),
        height: rgb.height(),
        data: rgb.into_raw(),
    })
}

/// Load an image source and convert it for the classifier
///
/// Decoding and resizing run on the blocking pool so the caller's worker
/// stays free.
pub async fn load_pixels(source: &ImageSource, size: u32) -> Result<PixelBuffer, PipelineError> {
    let bytes = read_source(source).await?;

    // Spawn blocking task for CPU-bound work
    tokio::task::spawn_blocking(move || to_pixel_buffer(&bytes, size))
        .await
        .map_err(|e| PipelineError::ImageConversion(format!("Task join error: {}", e)))?
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 13) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
