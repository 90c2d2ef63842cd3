//! # Photos Module
//!
//! Photos attached to a work order.
//!
//! - `collection` - the ordered set of stamped photos held by the form
//! - `intake` - stamps a selection of raw photos, one task per photo,
//!   preserving selection order and isolating per-photo failures

mod collection;
mod intake;

pub use collection::{CapturedPhoto, PhotoCollection};
pub use intake::{read_selection, IntakeReport, PhotoFile, PhotoIntake, RejectedPhoto};
