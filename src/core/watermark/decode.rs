//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG input (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::WatermarkError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Image formats recognised at intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Heic,
    Other,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("png") => Self::Png,
            Some("webp") => Self::WebP,
            Some("gif") => Self::Gif,
            Some("bmp") => Self::Bmp,
            Some("heic" | "heif") => Self::Heic,
            _ => Self::Other,
        }
    }

    /// Detect format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Self::Jpeg,
            [0x89, b'P', b'N', b'G', ..] => Self::Png,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Self::WebP,
            [b'G', b'I', b'F', b'8', ..] => Self::Gif,
            [b'B', b'M', ..] => Self::Bmp,
            [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c' | b'f' | b'x', ..] => {
                Self::Heic
            }
            _ => Self::Other,
        }
    }

    /// Whether the file looks like an image at all
    pub fn is_image(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Fast image decoder that uses optimized decoders per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode encoded image bytes using the fastest available decoder.
    ///
    /// `name` is only used for error messages.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<DynamicImage, WatermarkError> {
        match ImageFormat::sniff(bytes) {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(name, bytes).or_else(|_| Self::decode_fallback(name, bytes))
            }
            ImageFormat::Heic => Err(WatermarkError::Decode {
                name: name.to_string(),
                reason: "HEIC photos are not supported; export as JPEG".to_string(),
            }),
            _ => Self::decode_fallback(name, bytes),
        }
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(name: &str, bytes: &[u8]) -> Result<DynamicImage, WatermarkError> {
        let decode_error = |reason: String| WatermarkError::Decode {
            name: name.to_string(),
            reason,
        };

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| decode_error(format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| decode_error("Failed to get image info".to_string()))?;

        let width = info.width as u32;
        let height = info.height as u32;

        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGB buffer".to_string()))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGBA buffer".to_string()))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create Luma buffer".to_string()))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(name, bytes),
        };

        Ok(image)
    }

    /// Fallback to image crate for non-JPEG formats
    fn decode_fallback(name: &str, bytes: &[u8]) -> Result<DynamicImage, WatermarkError> {
        image::load_from_memory(bytes).map_err(|e| WatermarkError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}
