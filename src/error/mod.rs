//! # Error Module
//!
//! User-friendly error types for the work order pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - file names, URLs, what went wrong
//! - **User-friendly messages** - technicians in the field read these
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum WorkOrderError {
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },
}

/// Errors obtaining a position fix from the host platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission was denied")]
    PermissionDenied,

    #[error("Timed out waiting for a position fix after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Position unavailable: {reason}")]
    PositionUnavailable { reason: String },

    #[error("This device does not support geolocation")]
    Unsupported,
}

/// Errors from the reverse-geocoding collaborator.
///
/// These never reach the user: the location provider falls back to the
/// coordinate text instead.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Reverse geocoding request failed: {0}")]
    Transport(String),

    #[error("Reverse geocoding service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Reverse geocoding response was not valid JSON: {0}")]
    Malformed(String),

    #[error("Reverse geocoding response has no display name")]
    MissingDisplayName,
}

/// Errors while stamping a photo
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("Failed to decode image {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("{name} is not an image")]
    UnsupportedType { name: String },

    #[error("Failed to encode stamped image {name}: {reason}")]
    Encode { name: String, reason: String },

    #[error("Failed to load caption font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("Failed to read photo {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stamping task for {name} did not complete: {reason}")]
    TaskFailed { name: String, reason: String },
}

/// Errors dispatching the payload to the collection endpoint
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Failed to serialize work order: {0}")]
    Serialize(String),

    #[error("{0}")]
    Transport(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write config file {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, WorkOrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_includes_file_name() {
        let error = WatermarkError::Decode {
            name: "site-1.jpg".to_string(),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("site-1.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn timeout_reports_seconds() {
        let error = LocationError::Timeout { seconds: 10 };
        assert!(error.to_string().contains("10s"));
    }

    #[test]
    fn transport_error_is_verbatim() {
        let error = SubmitError::Transport("connection refused".to_string());
        assert_eq!(error.to_string(), "connection refused");
    }

    #[test]
    fn output_error_names_path_and_keeps_source() {
        use std::error::Error as _;

        let error = WorkOrderError::Output {
            path: PathBuf::from("stamped/01-site-stamped.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };

        assert!(!matches!(error, WorkOrderError::Validation(_)));
        assert!(error.to_string().contains("stamped/01-site-stamped.jpg"));
        assert!(error.source().is_some());
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let error: WorkOrderError = ConfigError::Invalid("roster is empty".to_string()).into();
        assert!(error.to_string().contains("roster is empty"));
    }
}
