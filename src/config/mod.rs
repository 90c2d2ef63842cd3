//! # Config Module
//!
//! Runtime settings, read from a JSON file at start-up and passed to the
//! controller. Every key is optional; missing keys take their defaults.
//!
//! ```json
//! {
//!   "endpoint_url": "https://example.com/hooks/work-orders",
//!   "roster": ["Johan Hurtado", "Luis Boada"],
//!   "watermark": { "jpeg_quality": 85 }
//! }
//! ```

use crate::core::geocode::NominatimConfig;
use crate::core::location::FixOptions;
use crate::core::watermark::{check_date_format, WatermarkConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "work-order-stamp";
const CONFIG_FILE: &str = "config.json";

/// Technicians who can be picked on the form, in display order
pub const DEFAULT_ROSTER: [&str; 9] = [
    "Johan Hurtado",
    "Ricardo Oyarzun",
    "José Mauricio",
    "Denys Marupa",
    "Pedro Sepulveda",
    "Giovanny Allilef",
    "Luis Boada",
    "Enyer Pozo",
    "Bastian Parada",
];

fn default_roster() -> Vec<String> {
    DEFAULT_ROSTER.iter().map(|name| name.to_string()).collect()
}

fn default_reverse_geocode_url() -> String {
    NominatimConfig::default().url
}

fn default_geocode_language() -> String {
    NominatimConfig::default().language
}

fn default_user_agent() -> String {
    NominatimConfig::default().user_agent
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fix_timeout_secs() -> u64 {
    10
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,
    /// Where work orders are posted. Empty until configured.
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "default_reverse_geocode_url")]
    pub reverse_geocode_url: String,
    #[serde(default = "default_geocode_language")]
    pub geocode_language: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_fix_timeout_secs")]
    pub fix_timeout_secs: u64,
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            endpoint_url: String::new(),
            reverse_geocode_url: default_reverse_geocode_url(),
            geocode_language: default_geocode_language(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            fix_timeout_secs: default_fix_timeout_secs(),
            watermark: WatermarkConfig::default(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/work-order-stamp/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |reason: String| ConfigError::Write {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| write_err(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.is_empty() {
            return Err(ConfigError::Invalid("roster must list at least one technician".into()));
        }
        if self.roster.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("roster contains a blank name".into()));
        }
        if !self.endpoint_url.is_empty() {
            check_http_url("endpoint_url", &self.endpoint_url)?;
        }
        check_http_url("reverse_geocode_url", &self.reverse_geocode_url)?;

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        if self.fix_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fix_timeout_secs must be positive".into()));
        }

        let watermark = &self.watermark;
        if watermark.band_height == 0 {
            return Err(ConfigError::Invalid("watermark.band_height must be positive".into()));
        }
        if !(1..=100).contains(&watermark.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "watermark.jpeg_quality must be between 1 and 100, got {}",
                watermark.jpeg_quality
            )));
        }
        if !(0.0..=1.0).contains(&watermark.band_opacity) {
            return Err(ConfigError::Invalid(format!(
                "watermark.band_opacity must be between 0 and 1, got {}",
                watermark.band_opacity
            )));
        }
        if watermark.font_size <= 0.0 {
            return Err(ConfigError::Invalid("watermark.font_size must be positive".into()));
        }
        check_date_format(&watermark.date_format)
            .map_err(|reason| ConfigError::Invalid(format!("watermark.date_format: {}", reason)))?;

        Ok(())
    }

    /// The endpoint, or an error when none is configured
    pub fn require_endpoint(&self) -> Result<&str, ConfigError> {
        if self.endpoint_url.trim().is_empty() {
            Err(ConfigError::Invalid(
                "endpoint_url is not set (use --endpoint or the config file)".into(),
            ))
        } else {
            Ok(&self.endpoint_url)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fix_options(&self) -> FixOptions {
        FixOptions {
            timeout: Duration::from_secs(self.fix_timeout_secs),
            ..FixOptions::default()
        }
    }

    pub fn geocoder_config(&self) -> NominatimConfig {
        NominatimConfig {
            url: self.reverse_geocode_url.clone(),
            language: self.geocode_language.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout(),
        }
    }
}

fn check_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| ConfigError::Invalid(format!("{} is not a valid URL: {}", key, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{} must use http or https, got {}",
            key, other
        ))),
    }
}
