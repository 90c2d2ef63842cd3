//! Reverse geocoder trait definition.

use crate::core::location::Coordinate;
use crate::error::GeocodeError;
use async_trait::async_trait;

/// Translates a coordinate into a human-readable address
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the display address for a coordinate
    async fn reverse(&self, coordinate: Coordinate) -> Result<String, GeocodeError>;
}

/// Geocoder that never resolves, for offline use.
///
/// Every lookup fails, so addresses fall back to the coordinate text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatesOnly;

#[async_trait]
impl ReverseGeocoder for CoordinatesOnly {
    async fn reverse(&self, _coordinate: Coordinate) -> Result<String, GeocodeError> {
        Err(GeocodeError::Transport("reverse geocoding disabled".to_string()))
    }
}
