// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! This module encodes composited images to portable still formats:
//! - PNG (lossless, the default)
//! - JPEG (with quality control)
//!
//! It also derives the small JPEG previews used for gallery listings. All
//! encoding runs on the blocking pool.

use crate::constants::preview;
use image::{ImageFormat, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// PNG format (lossless compression)
    Png,
    /// JPEG format (lossy compression)
    Jpeg,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Png => "png",
            EncodingFormat::Jpeg => "jpg",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data ready for storage
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with lossless PNG output
    pub fn new() -> Self {
        Self {
            format: EncodingFormat::Png,
            quality: EncodingQuality::High,
        }
    }

    /// Set encoding format
    pub fn set_format(&mut self, format: EncodingFormat) {
        self.format = format;
    }

    /// Set encoding quality (only affects JPEG)
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    /// Encode a composited image asynchronously
    ///
    /// # Returns
    /// * `Ok(EncodedImage)` - Encoded image data
    /// * `Err(String)` - Error message
    pub async fn encode(&self, image: RgbaImage) -> Result<EncodedImage, String> {
        let (width, height) = image.dimensions();
        info!(width, height, format = ?self.format, "Starting encoding");

        let format = self.format;
        let quality = self.quality;

        tokio::task::spawn_blocking(move || {
            let data = match format {
                EncodingFormat::Png => Self::encode_png(image)?,
                EncodingFormat::Jpeg => Self::encode_jpeg(image, quality)?,
            };

            debug!(size = data.len(), "Encoding complete");

            Ok(EncodedImage {
                data,
                format,
                width,
                height,
            })
        })
        .await
        .map_err(|e| format!("Encoding task error: {}", e))?
    }

    /// Derive a small JPEG preview from encoded photo bytes
    ///
    /// Previews are bounded to a small longest edge and always JPEG, so a
    /// gallery can show many of them cheaply regardless of the original
    /// format.
    pub async fn encode_preview(&self, original: Arc<[u8]>) -> Result<Vec<u8>, String> {
        tokio::task::spawn_blocking(move || {
            let decoded = image::load_from_memory(&original)
                .map_err(|e| format!("Preview decode failed: {}", e))?;

            let scaled = if decoded.width().max(decoded.height()) > preview::MAX_EDGE {
                decoded.thumbnail(preview::MAX_EDGE, preview::MAX_EDGE)
            } else {
                decoded
            };

            let rgb = scaled.to_rgb8();
            let mut buffer = Vec::new();
            let mut cursor = std::io::Cursor::new(&mut buffer);
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut cursor,
                EncodingQuality::Medium.jpeg_quality(),
            );
            encoder
                .encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| format!("Preview encoding failed: {}", e))?;

            debug!(size = buffer.len(), "Preview encoded");
            Ok(buffer)
        })
        .await
        .map_err(|e| format!("Preview task error: {}", e))?
    }

    /// Encode image as JPEG (alpha channel dropped)
    fn encode_jpeg(image: RgbaImage, quality: EncodingQuality) -> Result<Vec<u8>, String> {
        let rgb = rgba_to_rgb(&image)?;

        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| format!("JPEG encoding failed: {}", e))?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: RgbaImage) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| format!("PNG encoding failed: {}", e))?;

        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert RGBA to RGB by dropping the alpha channel
fn rgba_to_rgb(image: &RgbaImage) -> Result<image::RgbImage, String> {
    let (width, height) = image.dimensions();
    let rgb_data: Vec<u8> = image
        .as_raw()
        .chunks(4)
        .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
        .collect();

    image::RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| "Failed to create RGB image from converted data".to_string())
}
