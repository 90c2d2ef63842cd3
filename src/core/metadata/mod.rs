//! # Metadata Module
//!
//! Reads the GPS position a camera wrote into a photo's EXIF block
//! (GPSLatitude/GPSLongitude with their N/S, E/W refs).
//!
//! Phones write GPS tags into the JPEG they capture, so a photo taken on
//! site doubles as a position source when the host has no live fix.

use crate::core::location::Coordinate;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

/// Position recorded in a photo file, if it carries valid GPS tags
pub fn read_gps_position(path: &Path) -> Option<Coordinate> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot open photo for EXIF");
            return None;
        }
    };

    gps_position_from(&mut BufReader::new(file))
}

fn gps_position_from<R: BufRead + Seek>(reader: &mut R) -> Option<Coordinate> {
    let exif = Reader::new().read_from_container(reader).ok()?;
    position_from_exif(&exif)
}

fn position_from_exif(exif: &Exif) -> Option<Coordinate> {
    let latitude = read_gps_component(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let longitude = read_gps_component(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
    let coordinate = Coordinate::new(latitude, longitude);
    coordinate.is_valid().then_some(coordinate)
}

/// Read a degrees/minutes/seconds GPS tag and apply its hemisphere ref
fn read_gps_component(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|field| ascii_value(&field.value))?;
    let field = exif.get_field(value_tag, In::PRIMARY)?;

    let parts: Vec<f64> = match &field.value {
        Value::Rational(values) => values.iter().map(|v| v.to_f64()).collect(),
        Value::SRational(values) => values.iter().map(|v| v.to_f64()).collect(),
        _ => return None,
    };

    let degrees = dms_to_degrees(&parts)?;
    Some(apply_hemisphere(degrees, &reference))
}

/// Convert [degrees, minutes, seconds] to decimal degrees
fn dms_to_degrees(parts: &[f64]) -> Option<f64> {
    let degrees = *parts.first()?;
    let minutes = parts.get(1).copied().unwrap_or(0.0);
    let seconds = parts.get(2).copied().unwrap_or(0.0);
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

fn apply_hemisphere(degrees: f64, reference: &str) -> f64 {
    match reference.trim() {
        "S" | "W" => -degrees.abs(),
        _ => degrees,
    }
}

fn ascii_value(value: &Value) -> Option<String> {
    let Value::Ascii(values) = value else {
        return None;
    };
    let text = std::str::from_utf8(values.first()?).ok()?;
    let trimmed = text.trim_end_matches('\0').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A small JPEG whose EXIF block carries the given GPS tags
#[cfg(test)]
pub(crate) fn gps_tagged_jpeg(
    latitude: [u32; 3],
    latitude_ref: &str,
    longitude: [u32; 3],
    longitude_ref: &str,
) -> Vec<u8> {
    use exif::experimental::Writer;
    use exif::{Field, Rational};
    use std::io::Cursor;

    let dms = |parts: [u32; 3]| {
        Value::Rational(parts.iter().map(|&p| Rational::from((p, 1))).collect())
    };
    let field = |tag, value| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    };
    let fields = [
        field(Tag::GPSLatitudeRef, Value::Ascii(vec![latitude_ref.as_bytes().to_vec()])),
        field(Tag::GPSLatitude, dms(latitude)),
        field(Tag::GPSLongitudeRef, Value::Ascii(vec![longitude_ref.as_bytes().to_vec()])),
        field(Tag::GPSLongitude, dms(longitude)),
    ];

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut plain = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(8, 8)
        .write_to(&mut plain, image::ImageFormat::Jpeg)
        .unwrap();
    let plain = plain.into_inner();

    // SOI, then an APP1 "Exif" segment, then the rest of the encoded image
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&plain[2..]);
    jpeg
}
