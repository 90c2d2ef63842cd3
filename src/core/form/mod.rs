//! # Form Module
//!
//! The work order form and the controller that drives it.
//!
//! ## Components
//! - `state` - form fields, controller state and status banner
//! - `guard` - keeps submission non-reentrant
//! - `controller` - the `Editing → Submitting → Editing` state machine

mod controller;
mod guard;
mod state;

pub use controller::{
    location_error_message, Collaborators, FormController, SubmitOutcome, SubmitRejected,
    SUBMIT_SUCCESS_MESSAGE,
};
pub use guard::{SubmissionGuard, SubmissionPermit};
pub use state::{FormState, StatusBanner, WorkOrderForm};
