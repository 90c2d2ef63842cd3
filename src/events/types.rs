//! Event type definitions for form progress reporting.

use crate::core::form::FormState;
use crate::core::location::Coordinate;
use serde::{Deserialize, Serialize};

/// All events emitted while a work order is assembled and sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Location capture events
    Location(LocationEvent),
    /// Photo intake events
    Photo(PhotoEvent),
    /// Submission events
    Submission(SubmissionEvent),
    /// Form state machine events
    Form(FormEvent),
}

/// Events during a location capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationEvent {
    /// A capture request was issued
    CaptureStarted { request: u64 },
    /// A position fix arrived; the address lookup is next
    FixObtained { request: u64, coordinate: Coordinate },
    /// The address is known (`degraded` when it is the coordinate text)
    Resolved {
        request: u64,
        address: String,
        degraded: bool,
    },
    /// The fix could not be obtained
    Failed { request: u64, message: String },
    /// A superseded request finished and its result was dropped
    Discarded { request: u64 },
}

/// Events while photos are stamped and added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhotoEvent {
    /// A selection of photos is being processed
    BatchStarted { total: usize },
    /// A photo was stamped and added
    Stamped { index: usize, name: String },
    /// A photo was skipped; the rest of the batch continues
    Rejected {
        index: usize,
        name: String,
        reason: String,
    },
    /// The selection has been processed
    BatchCompleted { accepted: usize, rejected: usize },
    /// A photo was removed by the technician
    Removed { index: usize, name: String },
}

/// Events during submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmissionEvent {
    /// Validation passed and the payload is being sent
    Started { order_number: String, photos: usize },
    /// The request left without a transport error
    Dispatched { order_number: String },
    /// The request could not be sent
    Failed { message: String },
}

/// Events from the form state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormEvent {
    /// The controller moved to a new state
    StateChanged { state: FormState },
    /// Submission was refused by validation
    ValidationFailed { messages: Vec<String> },
    /// The form was cleared after a successful submission
    Reset,
}
