//! # Watermark Module
//!
//! Burns a location/time caption into the bottom of a photo.
//!
//! ## How It Works
//! 1. Decode the raw bytes (zune-jpeg for JPEG, image crate otherwise)
//! 2. Copy the pixels onto an RGBA surface of the same size
//! 3. Blend a half-transparent black band across the bottom
//! 4. Draw each caption line in white, left-aligned inside the band
//! 5. Re-encode as JPEG at a fixed quality
//!
//! Captions are never wrapped. A line wider than the photo is clipped at
//! the right edge.

pub mod caption;
pub mod compositor;
pub mod decode;
pub mod text;

pub use caption::{check_date_format, Caption, DEFAULT_DATE_FORMAT, NOT_AVAILABLE, NO_LOCATION};
pub use compositor::BandRect;
pub use decode::{FastDecoder, ImageFormat};
pub use text::CaptionFont;

use crate::error::WatermarkError;
use compositor::fill_band;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Layout and encoding settings for the caption band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Height of the band in pixels
    pub band_height: u32,
    /// Distance between consecutive caption baselines
    pub line_spacing: u32,
    /// Caption font size in pixels
    pub font_size: f32,
    /// Left margin of the caption
    pub margin_x: u32,
    /// Distance from the bottom edge up to the first baseline
    pub first_baseline_offset: u32,
    /// Band opacity (0.0 to 1.0)
    pub band_opacity: f32,
    /// JPEG quality (1 to 100)
    pub jpeg_quality: u8,
    /// chrono format string for the capture time line
    pub date_format: String,
    /// TrueType font for captions. The embedded bitmap font when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            band_height: 120,
            line_spacing: 35,
            font_size: 24.0,
            margin_x: 20,
            first_baseline_offset: 90,
            band_opacity: 0.5,
            jpeg_quality: 90,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            font_path: None,
        }
    }
}

/// A stamped photo, JPEG encoded
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("dimensions", &(self.width, self.height))
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Composes caption bands onto photos.
///
/// Cheap to clone; clones share the loaded font.
#[derive(Debug, Clone)]
pub struct Watermarker {
    config: WatermarkConfig,
    font: Arc<CaptionFont>,
}

impl Watermarker {
    /// Create a watermarker, loading the configured font if any
    pub fn new(config: WatermarkConfig) -> Result<Self, WatermarkError> {
        let font = match &config.font_path {
            Some(path) => CaptionFont::from_file(path)?,
            None => CaptionFont::Bitmap,
        };
        Ok(Self {
            config,
            font: Arc::new(font),
        })
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Decode, stamp and re-encode a photo.
    ///
    /// `name` identifies the photo in errors.
    pub fn annotate(
        &self,
        name: &str,
        raw: &[u8],
        caption: &Caption,
    ) -> Result<EncodedImage, WatermarkError> {
        let source = FastDecoder::decode(name, raw)?;
        let composed = self.compose(&source, caption);
        self.encode(name, &composed)
    }

    /// Draw the band and caption onto a copy of `source`
    pub fn compose(&self, source: &DynamicImage, caption: &Caption) -> RgbaImage {
        let mut surface = source.to_rgba8();
        let (width, height) = surface.dimensions();

        let band = BandRect::bottom(width, height, self.config.band_height);
        fill_band(
            &mut surface,
            band,
            Rgba([0, 0, 0, 255]),
            self.config.band_opacity,
        );

        let first_baseline = height as i32 - self.config.first_baseline_offset as i32;
        for (index, line) in caption.lines().iter().enumerate() {
            let baseline = first_baseline + (index as i32) * self.config.line_spacing as i32;
            self.font.draw_line(
                &mut surface,
                line,
                self.config.margin_x as i32,
                baseline,
                self.config.font_size,
                Rgba([255, 255, 255, 255]),
            );
        }

        surface
    }

    fn encode(&self, name: &str, surface: &RgbaImage) -> Result<EncodedImage, WatermarkError> {
        let (width, height) = surface.dimensions();
        let rgb = DynamicImage::ImageRgba8(surface.clone()).to_rgb8();

        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.config.jpeg_quality);
            encoder
                .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| WatermarkError::Encode {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(EncodedImage {
            bytes,
            width,
            height,
        })
    }
}
