//! The work order form state machine.
//!
//! `Editing → Submitting → Editing`. Every mutation goes through
//! `&mut FormController`; front ends read snapshots and listen to events.

use super::{FormState, StatusBanner, SubmissionGuard, WorkOrderForm};
use crate::config::AppConfig;
use crate::core::geocode::{NominatimGeocoder, ReverseGeocoder};
use crate::core::location::{
    Applied, FixOptions, LocationContext, LocationOutcome, LocationProvider, LocationTicket,
    PositionSource,
};
use crate::core::photos::{CapturedPhoto, IntakeReport, PhotoFile, PhotoIntake};
use crate::core::submission::{HttpSubmitter, SubmissionPayload, Submitter};
use crate::core::validation::{SubmissionValidator, ValidationFailure, ValidationMode};
use crate::core::watermark::{Caption, Watermarker};
use crate::error::{LocationError, SubmitError};
use crate::events::{Event, EventSender, FormEvent, LocationEvent, PhotoEvent, SubmissionEvent};
use chrono::{Local, Utc};
use std::sync::Arc;
use thiserror::Error;

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Work order submitted successfully";

/// A submit call that was refused before doing anything
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("A submission is already in progress")]
    AlreadySubmitting,
}

/// How an accepted submit call ended
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The request left without a transport error; the form was reset
    Submitted,
    /// Validation failed; nothing was sent
    Invalid(Vec<ValidationFailure>),
    /// Sending failed; the form is intact for a retry
    Failed(SubmitError),
}

/// Everything the controller talks to
#[derive(Clone)]
pub struct Collaborators {
    pub position: Arc<dyn PositionSource>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub submitter: Arc<dyn Submitter>,
    pub watermarker: Watermarker,
}

/// Owns one work order form for the session
pub struct FormController {
    form: WorkOrderForm,
    state: FormState,
    banner: StatusBanner,
    location: LocationProvider,
    intake: PhotoIntake,
    validator: SubmissionValidator,
    submitter: Arc<dyn Submitter>,
    guard: SubmissionGuard,
    events: EventSender,
}

impl FormController {
    pub fn new(roster: Vec<String>, collaborators: Collaborators, events: EventSender) -> Self {
        let Collaborators {
            position,
            geocoder,
            submitter,
            watermarker,
        } = collaborators;

        Self {
            form: WorkOrderForm::default(),
            state: FormState::Editing,
            banner: StatusBanner::None,
            location: LocationProvider::new(position, geocoder),
            intake: PhotoIntake::new(watermarker),
            validator: SubmissionValidator::new(roster),
            submitter,
            guard: SubmissionGuard::new(),
            events,
        }
    }

    /// Build from settings, using the Nominatim geocoder and HTTP submitter
    pub fn from_config(
        config: &AppConfig,
        position: Arc<dyn PositionSource>,
        events: EventSender,
    ) -> crate::Result<Self> {
        let collaborators = Collaborators {
            position,
            geocoder: Arc::new(NominatimGeocoder::new(config.geocoder_config())?),
            submitter: Arc::new(HttpSubmitter::new(
                config.require_endpoint()?,
                config.request_timeout(),
            )?),
            watermarker: Watermarker::new(config.watermark.clone())?,
        };
        Ok(Self::new(config.roster.clone(), collaborators, events)
            .with_fix_options(config.fix_options()))
    }

    pub fn with_fix_options(mut self, options: FixOptions) -> Self {
        self.location = self.location.with_options(options);
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validator = self.validator.with_mode(mode);
        self
    }

    // ── Snapshots ─────────────────────────────────────────────────

    pub fn form(&self) -> &WorkOrderForm {
        &self.form
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn banner(&self) -> &StatusBanner {
        &self.banner
    }

    pub fn location(&self) -> &LocationContext {
        &self.form.location
    }

    pub fn roster(&self) -> &[String] {
        self.validator.roster()
    }

    pub fn submission_guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    // ── Lifecycle ─────────────────────────────────────────────────

    /// Enter `Editing` and capture the location
    pub async fn mount(&mut self) {
        self.set_state(FormState::Editing);
        self.refresh_location().await;
    }

    /// Capture the location again, superseding any capture in flight
    pub async fn refresh_location(&mut self) -> Applied {
        let ticket = self.begin_location();
        let outcome = self.location.resolve(&ticket).await;
        self.complete_location(&ticket, outcome)
    }

    /// Issue a capture ticket without waiting for the result
    pub fn begin_location(&mut self) -> LocationTicket {
        let ticket = self.location.begin(&mut self.form.location);
        self.events.send(Event::Location(LocationEvent::CaptureStarted {
            request: ticket.id(),
        }));
        ticket
    }

    /// Run a capture to completion without applying it
    pub async fn resolve_location(&self, ticket: &LocationTicket) -> LocationOutcome {
        self.location.resolve(ticket).await
    }

    /// Apply a finished capture; stale tickets are discarded
    pub fn complete_location(&mut self, ticket: &LocationTicket, outcome: LocationOutcome) -> Applied {
        let request = ticket.id();
        let applied = self.location.apply(ticket, &outcome, &mut self.form.location);

        match (&applied, outcome) {
            (Applied::Stale, _) => {
                self.events
                    .send(Event::Location(LocationEvent::Discarded { request }));
            }
            (
                Applied::Updated,
                LocationOutcome::Resolved {
                    coordinate,
                    address,
                },
            ) => {
                self.events.send(Event::Location(LocationEvent::FixObtained {
                    request,
                    coordinate,
                }));
                self.events.send(Event::Location(LocationEvent::Resolved {
                    request,
                    address: address.address,
                    degraded: address.degraded,
                }));
            }
            (Applied::Failed(e), _) => {
                let message = location_error_message(e);
                self.events.send(Event::Location(LocationEvent::Failed {
                    request,
                    message: message.clone(),
                }));
                self.banner = StatusBanner::Error(message);
            }
            (Applied::Updated, LocationOutcome::Failed(_)) => {}
        }

        applied
    }

    // ── Field setters ─────────────────────────────────────────────

    pub fn set_order_number(&mut self, value: impl Into<String>) {
        self.form.order_number = value.into();
    }

    pub fn set_technician(&mut self, value: impl Into<String>) {
        self.form.technician = value.into();
    }

    /// Overwrite the resolved address by hand. The coordinate is untouched.
    pub fn set_address(&mut self, value: impl Into<String>) {
        self.form.location.set_address(value);
    }

    /// Stamp the selected photos with the current location and time, then
    /// append them in selection order
    pub async fn add_photos(&mut self, files: Vec<PhotoFile>) -> IntakeReport {
        let caption = Caption::for_location(
            &self.form.location,
            &Local::now(),
            &self.intake.watermarker().config().date_format,
        );

        let mut report = self.intake.annotate_batch(files, &caption, &self.events).await;

        for photo in report.accepted.drain(..) {
            self.form.photos.add(photo);
        }
        if let Some(first) = report.rejected.first() {
            self.banner = StatusBanner::Error(format!(
                "Could not process photo {}: {}",
                first.name, first.reason
            ));
        }

        report
    }

    /// Remove one photo. Out-of-range indices change nothing.
    pub fn remove_photo(&mut self, index: usize) -> Option<CapturedPhoto> {
        let removed = self.form.photos.remove_at(index)?;
        self.events.send(Event::Photo(PhotoEvent::Removed {
            index,
            name: removed.original_name.clone(),
        }));
        Some(removed)
    }

    // ── Submission ────────────────────────────────────────────────

    /// Validate and send the work order.
    ///
    /// Refused while another submission holds the guard.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitRejected> {
        let permit = self
            .guard
            .try_acquire()
            .ok_or(SubmitRejected::AlreadySubmitting)?;

        if let Err(failures) = self.validator.validate(&self.form) {
            let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
            tracing::debug!(?messages, "submission blocked by validation");
            self.banner = StatusBanner::Error(messages.join("\n"));
            self.events
                .send(Event::Form(FormEvent::ValidationFailed { messages }));
            return Ok(SubmitOutcome::Invalid(failures));
        }

        self.set_state(FormState::Submitting);
        self.banner = StatusBanner::None;

        let payload = SubmissionPayload::from_form(&self.form, Utc::now());
        self.events.send(Event::Submission(SubmissionEvent::Started {
            order_number: payload.order_number.clone(),
            photos: payload.photos.len(),
        }));

        let result = self.submitter.submit(&payload).await;
        self.set_state(FormState::Editing);
        drop(permit);

        match result {
            Ok(()) => {
                tracing::info!(
                    order = %payload.order_number,
                    destination = self.submitter.destination(),
                    "work order dispatched"
                );
                self.events.send(Event::Submission(SubmissionEvent::Dispatched {
                    order_number: payload.order_number,
                }));

                self.form.clear_entries();
                self.events.send(Event::Form(FormEvent::Reset));
                self.banner = StatusBanner::Success(SUBMIT_SUCCESS_MESSAGE.to_string());
                self.refresh_location().await;
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) => {
                tracing::warn!(error = %e, "work order submission failed");
                let message = format!("Failed to submit work order: {}", e);
                self.events.send(Event::Submission(SubmissionEvent::Failed {
                    message: message.clone(),
                }));
                self.banner = StatusBanner::Error(message);
                Ok(SubmitOutcome::Failed(e))
            }
        }
    }

    fn set_state(&mut self, state: FormState) {
        self.state = state;
        self.events.send(Event::Form(FormEvent::StateChanged { state }));
    }
}

/// Text shown to the technician when a fix fails
pub fn location_error_message(error: &LocationError) -> String {
    match error {
        LocationError::Unsupported => error.to_string(),
        other => format!("Could not obtain location: {}", other),
    }
}
