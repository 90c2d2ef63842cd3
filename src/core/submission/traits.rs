//! Submitter trait definition.

use super::SubmissionPayload;
use crate::error::SubmitError;
use async_trait::async_trait;

/// Delivers a finished work order to its destination
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Send the payload.
    ///
    /// `Ok` means the request left the device. The endpoint's reply is
    /// not inspected.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;

    /// Where payloads go, for logging
    fn destination(&self) -> &str;
}
