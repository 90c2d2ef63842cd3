//! Alpha compositing for the caption band.

use image::{Rgba, RgbaImage};

/// Geometry of the band, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRect {
    pub top: u32,
    pub height: u32,
    pub width: u32,
}

impl BandRect {
    /// Band spanning the full width, anchored to the bottom edge.
    ///
    /// Clamped to the surface height for images shorter than the band.
    pub fn bottom(surface_width: u32, surface_height: u32, band_height: u32) -> Self {
        let height = band_height.min(surface_height);
        Self {
            top: surface_height - height,
            height,
            width: surface_width,
        }
    }

    pub fn contains_row(&self, y: u32) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Darken (or tint) the band region with `color` at the given opacity
pub fn fill_band(target: &mut RgbaImage, band: BandRect, color: Rgba<u8>, opacity: f32) {
    let weight = coverage(color[3], opacity);
    for y in band.top..band.top + band.height {
        for x in 0..band.width {
            let pixel = target.get_pixel_mut(x, y);
            *pixel = mix(*pixel, color, weight);
        }
    }
}

/// Paint `color` over `background`, scaled by `opacity` (0.0 to 1.0)
pub fn blend_pixels(background: Rgba<u8>, color: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    mix(background, color, coverage(color[3], opacity))
}

/// Effective weight of a paint colour, 0..=255
fn coverage(alpha: u8, opacity: f32) -> u16 {
    let opacity = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    (alpha as u16 * opacity + 127) / 255
}

/// Integer lerp towards `color` by `weight`/255; photo alpha only grows
fn mix(background: Rgba<u8>, color: Rgba<u8>, weight: u16) -> Rgba<u8> {
    if weight == 0 {
        return background;
    }
    let keep = 255 - weight;
    let lerp = |paint: u8, base: u8| ((paint as u16 * weight + base as u16 * keep + 127) / 255) as u8;
    let alpha = background[3] as u16 + ((255 - background[3] as u16) * weight + 127) / 255;

    Rgba([
        lerp(color[0], background[0]),
        lerp(color[1], background[1]),
        lerp(color[2], background[2]),
        alpha.min(255) as u8,
    ])
}
