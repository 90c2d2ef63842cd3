//! # Geocode Module
//!
//! Reverse geocoding: coordinate → display address.
//!
//! Failures here are never fatal. The location provider swaps in the
//! coordinate text when a lookup fails for any reason.

mod nominatim;
mod traits;

pub use nominatim::{parse_display_name, NominatimConfig, NominatimGeocoder};
pub use traits::{CoordinatesOnly, ReverseGeocoder};
