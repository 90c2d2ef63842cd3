//! Caption text burned into the watermark band.

use crate::core::location::LocationContext;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};

/// Shown in place of the address when none is known
pub const NO_LOCATION: &str = "No location";

/// Shown in place of a missing coordinate component
pub const NOT_AVAILABLE: &str = "N/A";

/// Default layout for the capture time (day-month-year, 24h clock)
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y, %H:%M:%S";

/// Check that `pattern` is a usable chrono strftime layout
pub fn check_date_format(pattern: &str) -> Result<(), String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        Err(format!("{:?} is not a valid date format", pattern))
    } else {
        Ok(())
    }
}

/// Render a timestamp, falling back to the default layout if `pattern` is unusable
fn format_timestamp<Tz>(captured_at: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut rendered = String::new();
    if check_date_format(pattern).is_ok()
        && write!(rendered, "{}", captured_at.format(pattern)).is_ok()
    {
        return rendered;
    }

    tracing::warn!(pattern, "unusable date format, using default");
    captured_at.format(DEFAULT_DATE_FORMAT).to_string()
}

/// Ordered caption lines, top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    lines: Vec<String>,
}

impl Caption {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The canonical three-line caption: address, coordinates, capture time
    pub fn for_location<Tz>(
        location: &LocationContext,
        captured_at: &DateTime<Tz>,
        date_format: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let address = location.address.trim();
        let address_line = if address.is_empty() {
            NO_LOCATION.to_string()
        } else {
            address.to_string()
        };

        let (lat, lng) = match location.coordinate {
            Some(c) => (format!("{:.6}", c.latitude), format!("{:.6}", c.longitude)),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };

        Self {
            lines: vec![
                address_line,
                format!("Lat: {}, Lng: {}", lat, lng),
                format_timestamp(captured_at, date_format),
            ],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::{Coordinate, LocationStatus};
    use chrono::FixedOffset;

    fn santiago_time() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 14, 5, 9)
            .unwrap()
    }

    #[test]
    fn canonical_caption_has_three_lines() {
        let location = LocationContext {
            coordinate: Some(Coordinate::new(-33.45, -70.66)),
            address: "Santiago, Chile".to_string(),
            status: LocationStatus::Resolved,
        };

        let caption = Caption::for_location(&location, &santiago_time(), DEFAULT_DATE_FORMAT);

        assert_eq!(
            caption.lines(),
            &[
                "Santiago, Chile".to_string(),
                "Lat: -33.450000, Lng: -70.660000".to_string(),
                "18-10-2026, 14:05:09".to_string(),
            ]
        );
    }

    #[test]
    fn missing_location_uses_placeholders() {
        let caption = Caption::for_location(
            &LocationContext::default(),
            &santiago_time(),
            DEFAULT_DATE_FORMAT,
        );

        assert_eq!(caption.lines()[0], NO_LOCATION);
        assert_eq!(caption.lines()[1], "Lat: N/A, Lng: N/A");
    }

    #[test]
    fn bad_date_format_falls_back_to_default() {
        let caption = Caption::for_location(&LocationContext::default(), &santiago_time(), "%Q");
        assert_eq!(caption.lines()[2], "18-10-2026, 14:05:09");
    }

    #[test]
    fn date_format_check() {
        assert!(check_date_format(DEFAULT_DATE_FORMAT).is_ok());
        assert!(check_date_format("%Y-%m-%dT%H:%M").is_ok());
        assert!(check_date_format("%Q").is_err());
        assert!(check_date_format("%").is_err());
    }

    #[test]
    fn blank_address_counts_as_missing() {
        let location = LocationContext {
            coordinate: Some(Coordinate::new(1.0, 2.0)),
            address: "   ".to_string(),
            status: LocationStatus::Resolved,
        };
        let caption = Caption::for_location(&location, &santiago_time(), DEFAULT_DATE_FORMAT);
        assert_eq!(caption.lines()[0], NO_LOCATION);
    }
}
