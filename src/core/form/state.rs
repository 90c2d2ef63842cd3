//! The in-memory work order being assembled.

use crate::core::location::LocationContext;
use crate::core::photos::PhotoCollection;
use serde::{Deserialize, Serialize};

/// Fields of one work order. Lives only for the session.
#[derive(Debug, Clone, Default)]
pub struct WorkOrderForm {
    pub order_number: String,
    pub technician: String,
    pub photos: PhotoCollection,
    pub location: LocationContext,
}

impl WorkOrderForm {
    /// Clear what the technician typed and picked after a successful send.
    ///
    /// The location is kept; the controller re-captures it.
    pub fn clear_entries(&mut self) {
        self.order_number.clear();
        self.technician.clear();
        self.photos.clear();
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormState {
    Editing,
    Submitting,
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormState::Editing => write!(f, "editing"),
            FormState::Submitting => write!(f, "submitting"),
        }
    }
}

/// Transient message shown above the form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusBanner {
    #[default]
    None,
    Error(String),
    Success(String),
}

impl StatusBanner {
    pub fn message(&self) -> Option<&str> {
        match self {
            StatusBanner::None => None,
            StatusBanner::Error(message) | StatusBanner::Success(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusBanner::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::{Coordinate, LocationStatus};

    #[test]
    fn clear_entries_keeps_location() {
        let mut form = WorkOrderForm {
            order_number: "12345".to_string(),
            technician: "Johan Hurtado".to_string(),
            location: LocationContext {
                coordinate: Some(Coordinate::new(-33.45, -70.66)),
                address: "Santiago, Chile".to_string(),
                status: LocationStatus::Resolved,
            },
            ..Default::default()
        };

        form.clear_entries();

        assert!(form.order_number.is_empty());
        assert!(form.technician.is_empty());
        assert!(form.photos.is_empty());
        assert_eq!(form.location.address, "Santiago, Chile");
    }

    #[test]
    fn banner_message() {
        assert_eq!(StatusBanner::None.message(), None);
        assert_eq!(StatusBanner::Error("bad".into()).message(), Some("bad"));
        assert!(StatusBanner::Error("bad".into()).is_error());
        assert!(!StatusBanner::Success("ok".into()).is_error());
    }
}
