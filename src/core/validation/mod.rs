//! # Validation Module
//!
//! Rules a work order must pass before it may be sent.
//!
//! ## Rules (in precedence order)
//! 1. Order number is not blank
//! 2. Order number is digits only
//! 3. A technician from the roster is selected
//! 4. At least one photo is attached
//! 5. A GPS coordinate was captured (a degraded address is fine)

use crate::core::form::WorkOrderForm;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn order_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only: `\d` would also admit other Unicode digits
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+$").expect("order number pattern is valid"))
}

/// A rule the form failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyOrderNumber,
    NonNumericOrderNumber,
    MissingTechnician,
    UnknownTechnician { name: String },
    NoPhotos,
    MissingLocation,
}

impl ValidationFailure {
    /// Form field the failure refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationFailure::EmptyOrderNumber | ValidationFailure::NonNumericOrderNumber => {
                "order_number"
            }
            ValidationFailure::MissingTechnician | ValidationFailure::UnknownTechnician { .. } => {
                "technician"
            }
            ValidationFailure::NoPhotos => "photos",
            ValidationFailure::MissingLocation => "location",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::EmptyOrderNumber => write!(f, "Enter the work order number"),
            ValidationFailure::NonNumericOrderNumber => {
                write!(f, "The work order number must contain only digits")
            }
            ValidationFailure::MissingTechnician => write!(f, "Select a technician"),
            ValidationFailure::UnknownTechnician { name } => {
                write!(f, "Select a technician from the list ({} is not on it)", name)
            }
            ValidationFailure::NoPhotos => write!(f, "Add at least one photo"),
            ValidationFailure::MissingLocation => write!(f, "GPS location has not been captured"),
        }
    }
}

/// Whether to stop at the first failed rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    FirstFailure,
    CollectAll,
}

/// Checks a form against the submission rules
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    roster: Vec<String>,
    mode: ValidationMode,
}

impl SubmissionValidator {
    pub fn new(roster: Vec<String>) -> Self {
        Self {
            roster,
            mode: ValidationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Validate the form.
    ///
    /// In `FirstFailure` mode the error list has exactly one entry.
    pub fn validate(&self, form: &WorkOrderForm) -> Result<(), Vec<ValidationFailure>> {
        let mut failures = Vec::new();

        if let Some(failure) = self.order_number_failure(&form.order_number) {
            failures.push(failure);
            if self.mode == ValidationMode::FirstFailure {
                return Err(failures);
            }
        }

        let checks = [
            self.technician_failure(&form.technician),
            form.photos.is_empty().then_some(ValidationFailure::NoPhotos),
            form.location
                .coordinate
                .is_none()
                .then_some(ValidationFailure::MissingLocation),
        ];

        for failure in checks.into_iter().flatten() {
            failures.push(failure);
            if self.mode == ValidationMode::FirstFailure {
                break;
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    fn order_number_failure(&self, order_number: &str) -> Option<ValidationFailure> {
        let trimmed = order_number.trim();
        if trimmed.is_empty() {
            Some(ValidationFailure::EmptyOrderNumber)
        } else if !is_valid_order_number(trimmed) {
            Some(ValidationFailure::NonNumericOrderNumber)
        } else {
            None
        }
    }

    fn technician_failure(&self, technician: &str) -> Option<ValidationFailure> {
        if technician.is_empty() {
            Some(ValidationFailure::MissingTechnician)
        } else if !self.roster.iter().any(|name| name == technician) {
            Some(ValidationFailure::UnknownTechnician {
                name: technician.to_string(),
            })
        } else {
            None
        }
    }
}

/// Digits-only check applied to the trimmed order number
pub fn is_valid_order_number(order_number: &str) -> bool {
    order_number_pattern().is_match(order_number.trim())
}
