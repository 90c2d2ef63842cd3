//! # Core Module
//!
//! The UI-agnostic work order engine.
//!
//! ## Modules
//! - `location` - Captures a position fix and guards against stale results
//! - `geocode` - Turns a coordinate into a display address
//! - `metadata` - Reads EXIF GPS tags (offline position source)
//! - `watermark` - Stamps the caption band onto a photo
//! - `photos` - The photo collection and batch intake
//! - `validation` - Rules a work order must pass before sending
//! - `submission` - Payload serialization and delivery
//! - `form` - The form state machine tying it all together

pub mod form;
pub mod geocode;
pub mod location;
pub mod metadata;
pub mod photos;
pub mod submission;
pub mod validation;
pub mod watermark;

// Re-export commonly used types
pub use form::{FormController, FormState, StatusBanner, WorkOrderForm};
pub use location::{Coordinate, LocationContext, LocationStatus};
pub use metadata::read_gps_position;
pub use photos::{CapturedPhoto, PhotoCollection, PhotoFile};
pub use submission::{SubmissionPayload, Submitter};
pub use watermark::{Caption, Watermarker};
