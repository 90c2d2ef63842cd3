//! Position sources: where a coordinate fix comes from.

use super::Coordinate;
use crate::core::metadata::read_gps_position;
use crate::error::LocationError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Options for a one-shot position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    /// Ask for the most accurate fix the platform can give
    pub high_accuracy: bool,
    /// Upper bound on the wait for a fix
    pub timeout: Duration,
    /// Oldest cached fix that may be returned. Zero means a fresh fix.
    pub maximum_age: Duration,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// The host platform's positioning capability
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Request a single position fix
    async fn current_position(&self, options: FixOptions) -> Result<Coordinate, LocationError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// A coordinate supplied by the operator
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    coordinate: Coordinate,
}

impl FixedPosition {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self, _options: FixOptions) -> Result<Coordinate, LocationError> {
        if !self.coordinate.is_valid() {
            return Err(LocationError::PositionUnavailable {
                reason: format!("coordinate out of range: {}", self.coordinate),
            });
        }
        Ok(self.coordinate)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Reads the GPS tags of a photo taken on site
#[derive(Debug, Clone)]
pub struct ExifPosition {
    path: PathBuf,
}

impl ExifPosition {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PositionSource for ExifPosition {
    async fn current_position(&self, _options: FixOptions) -> Result<Coordinate, LocationError> {
        let path = self.path.clone();
        let position = tokio::task::spawn_blocking(move || read_gps_position(&path))
            .await
            .map_err(|e| LocationError::PositionUnavailable {
                reason: e.to_string(),
            })?;

        position.ok_or_else(|| LocationError::PositionUnavailable {
                reason: format!("{} has no GPS tags", self.path.display()),
            })
    }

    fn name(&self) -> &'static str {
        "exif"
    }
}

/// A host without any positioning capability
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl PositionSource for Unavailable {
    async fn current_position(&self, _options: FixOptions) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
