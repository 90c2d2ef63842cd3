//! Fire-and-forget JSON POST.

use super::{SubmissionPayload, Submitter};
use crate::error::SubmitError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Posts work orders to an HTTP endpoint.
///
/// The endpoint's status and body are ignored; only a failure to send
/// the request counts as an error.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let body = payload.to_json()?;
        tracing::info!(
            endpoint = %self.endpoint,
            order = %payload.order_number,
            photos = payload.photos.len(),
            bytes = body.len(),
            "posting work order"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        tracing::debug!(status = %response.status(), "endpoint replied");
        Ok(())
    }

    fn destination(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            order_number: "1".to_string(),
            technician: "Luis Boada".to_string(),
            photos: vec![],
            location: None,
            address: String::new(),
            submitted_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let submitter =
            HttpSubmitter::new("http://127.0.0.1:1/orders", Duration::from_secs(2)).unwrap();

        let err = submitter.submit(&payload()).await.unwrap_err();

        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_endpoint_is_transport_error() {
        let submitter = HttpSubmitter::new("not a url", Duration::from_secs(2)).unwrap();

        let err = submitter.submit(&payload()).await.unwrap_err();

        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[test]
    fn destination_is_endpoint() {
        let submitter =
            HttpSubmitter::new("https://example.com/orders", Duration::from_secs(2)).unwrap();
        assert_eq!(submitter.destination(), "https://example.com/orders");
    }
}
