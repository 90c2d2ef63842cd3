//! # Submission Module
//!
//! Serializing a validated work order and handing it to the endpoint.
//!
//! Delivery is fire-and-forget: the reply is never read, so a request
//! that reaches the server counts as submitted whatever it answers.

mod http;
mod payload;
mod traits;

pub use http::HttpSubmitter;
pub use payload::SubmissionPayload;
pub use traits::Submitter;
