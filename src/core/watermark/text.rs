//! Caption text rendering.
//!
//! Two font backends:
//! - an embedded 8x8 bitmap font (basic Latin + Latin-1), scaled with
//!   nearest-neighbour. Needs no font files, output is the same everywhere.
//! - any TrueType/OpenType file, rasterised with `ab_glyph`.
//!
//! Text is drawn straight onto the target surface. Nothing is wrapped:
//! glyphs past the right edge are clipped.

use super::compositor::blend_pixels;
use crate::error::WatermarkError;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Font used for captions
pub enum CaptionFont {
    Bitmap,
    TrueType(FontVec),
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionFont::Bitmap => write!(f, "CaptionFont::Bitmap"),
            CaptionFont::TrueType(_) => write!(f, "CaptionFont::TrueType"),
        }
    }
}

impl CaptionFont {
    /// Load a TrueType/OpenType font from disk
    pub fn from_file(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path).map_err(|e| WatermarkError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| WatermarkError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(CaptionFont::TrueType(font))
    }

    /// Draw one line of text with its baseline at `baseline_y`
    pub fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        baseline_y: i32,
        font_size: f32,
        color: Rgba<u8>,
    ) {
        match self {
            CaptionFont::Bitmap => draw_bitmap_line(canvas, text, x, baseline_y, font_size, color),
            CaptionFont::TrueType(font) => {
                draw_truetype_line(canvas, font, text, x, baseline_y, font_size, color)
            }
        }
    }
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

fn draw_bitmap_line(
    canvas: &mut RgbaImage,
    text: &str,
    x: i32,
    baseline_y: i32,
    font_size: f32,
    color: Rgba<u8>,
) {
    let scale = ((font_size / 8.0).round() as i32).max(1);
    // Row 7 of each cell is reserved for descenders
    let top = baseline_y - 7 * scale;
    let mut cursor_x = x;

    for c in text.chars() {
        let glyph = bitmap_glyph(c);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let base_x = cursor_x + col * scale;
                let base_y = top + row as i32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        put_blended(canvas, base_x + dx, base_y + dy, color);
                    }
                }
            }
        }
        cursor_x += 8 * scale;
        if cursor_x >= canvas.width() as i32 {
            break;
        }
    }
}

fn draw_truetype_line(
    canvas: &mut RgbaImage,
    font: &FontVec,
    text: &str,
    x: i32,
    baseline_y: i32,
    font_size: f32,
    color: Rgba<u8>,
) {
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);
    let mut cursor_x = x as f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph =
            glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y as f32));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32) as u8;
                put_blended(
                    canvas,
                    px as i32 + bounds.min.x as i32,
                    py as i32 + bounds.min.y as i32,
                    Rgba([color[0], color[1], color[2], alpha]),
                );
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
        if cursor_x >= canvas.width() as f32 {
            break;
        }
    }
}

fn put_blended(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let existing = *canvas.get_pixel(x as u32, y as u32);
    canvas.put_pixel(x as u32, y as u32, blend_pixels(existing, color, 1.0));
}
