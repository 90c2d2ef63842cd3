//! Location value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A captured latitude/longitude pair.
///
/// Replaced wholesale on re-capture, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Textual address used when reverse geocoding fails
    pub fn fallback_address(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }

    /// Check that both components are finite and in range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {:.6}, Lng: {:.6}", self.latitude, self.longitude)
    }
}

/// Lifecycle of the session's location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    /// No capture requested yet
    Idle,
    /// Waiting for a position fix
    Loading,
    /// Fix obtained, waiting for the address lookup
    ResolvingAddress,
    /// Coordinate and address available
    Resolved,
    /// The fix could not be obtained
    Failed,
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationStatus::Idle => write!(f, "idle"),
            LocationStatus::Loading => write!(f, "obtaining location"),
            LocationStatus::ResolvingAddress => write!(f, "resolving address"),
            LocationStatus::Resolved => write!(f, "resolved"),
            LocationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Current location as seen by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    pub coordinate: Option<Coordinate>,
    pub address: String,
    pub status: LocationStatus,
}

impl LocationContext {
    /// Context at session start, before the first capture runs
    pub fn loading() -> Self {
        Self {
            coordinate: None,
            address: String::new(),
            status: LocationStatus::Loading,
        }
    }

    /// Overwrite the address by hand. The coordinate is left untouched.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.status,
            LocationStatus::Loading | LocationStatus::ResolvingAddress
        )
    }
}

impl Default for LocationContext {
    fn default() -> Self {
        Self {
            coordinate: None,
            address: String::new(),
            status: LocationStatus::Idle,
        }
    }
}
