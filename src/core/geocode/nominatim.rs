//! Nominatim-compatible reverse geocoding over HTTP.

use super::ReverseGeocoder;
use crate::core::location::Coordinate;
use crate::error::GeocodeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

/// Settings for [`NominatimGeocoder`]
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the `/reverse` endpoint
    pub url: String,
    /// Preferred language for the returned address
    pub language: String,
    /// Sent as `User-Agent`; Nominatim rejects anonymous clients
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            language: "es".to_string(),
            user_agent: concat!("work-order-stamp/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| GeocodeError::Transport(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the request URL for a coordinate
    pub fn request_url(&self, coordinate: Coordinate) -> Result<reqwest::Url, GeocodeError> {
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let params = [
            ("format", "json"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("accept-language", self.config.language.as_str()),
        ];
        reqwest::Url::parse_with_params(&self.config.url, &params)
            .map_err(|e| GeocodeError::Transport(format!("invalid geocoder URL: {}", e)))
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let url = self.request_url(coordinate)?;
        tracing::debug!(%url, "reverse geocoding");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        parse_display_name(&body)
    }
}

/// Pull `display_name` out of a reverse geocoding response body
pub fn parse_display_name(body: &str) -> Result<String, GeocodeError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

    match json["display_name"].as_str().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(GeocodeError::MissingDisplayName),
    }
}
