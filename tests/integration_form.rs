//! Integration tests for the form controller.
//!
//! End-to-end runs with in-process collaborators:
//! - Successful submission and reset
//! - Non-numeric order number
//! - Geocoder failure falling back to coordinates
//! - No photos attached
//! - Location completions arriving out of order

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use work_order_stamp::core::form::{
    Collaborators, FormController, FormState, StatusBanner, SubmitOutcome,
};
use work_order_stamp::core::geocode::ReverseGeocoder;
use work_order_stamp::core::location::{
    Applied, Coordinate, FixedPosition, LocationStatus, PositionSource,
};
use work_order_stamp::core::photos::PhotoFile;
use work_order_stamp::core::submission::{SubmissionPayload, Submitter};
use work_order_stamp::core::validation::ValidationFailure;
use work_order_stamp::core::watermark::{WatermarkConfig, Watermarker};
use work_order_stamp::error::{GeocodeError, SubmitError};
use work_order_stamp::events::{null_sender, Event, EventChannel, LocationEvent};
use work_order_stamp::AppConfig;

/// Geocoder that answers from a script, optionally after a delay
struct ScriptedGeocoder {
    answer: Result<&'static str, ()>,
    delay: Duration,
}

impl ScriptedGeocoder {
    fn answering(address: &'static str) -> Self {
        Self {
            answer: Ok(address),
            delay: Duration::ZERO,
        }
    }

    fn failing() -> Self {
        Self {
            answer: Err(()),
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse(&self, _coordinate: Coordinate) -> Result<String, GeocodeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.answer {
            Ok(address) => Ok(address.to_string()),
            Err(()) => Err(GeocodeError::Transport("connection reset".to_string())),
        }
    }
}

/// Submitter that keeps every payload it is given
#[derive(Default)]
struct RecordingSubmitter {
    sent: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingSubmitter {
    fn sent(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn destination(&self) -> &str {
        "memory"
    }
}

fn santiago() -> Coordinate {
    Coordinate::new(-33.45, -70.66)
}

fn photo(name: &str) -> PhotoFile {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([30, 140, 60])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .unwrap();
    PhotoFile::new(name, bytes)
}

fn controller(
    position: Arc<dyn PositionSource>,
    geocoder: ScriptedGeocoder,
    submitter: Arc<RecordingSubmitter>,
) -> FormController {
    let config = AppConfig::default();
    let collaborators = Collaborators {
        position,
        geocoder: Arc::new(geocoder),
        submitter,
        watermarker: Watermarker::new(WatermarkConfig::default()).unwrap(),
    };
    FormController::new(config.roster, collaborators, null_sender())
}

#[tokio::test]
async fn valid_work_order_is_submitted_and_form_resets() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::answering("Santiago, Chile"),
        submitter.clone(),
    );

    form.mount().await;
    form.set_order_number("12345");
    form.set_technician("Johan Hurtado");
    form.add_photos(vec![photo("site.jpg")]).await;

    let outcome = form.submit().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Submitted));
    let sent = submitter.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].order_number, "12345");
    assert_eq!(sent[0].technician, "Johan Hurtado");
    assert_eq!(sent[0].address, "Santiago, Chile");
    assert_eq!(sent[0].location, Some(santiago()));
    assert_eq!(sent[0].photos.len(), 1);
    assert!(sent[0].submitted_at.ends_with('Z'));

    assert_eq!(
        form.banner(),
        &StatusBanner::Success("Work order submitted successfully".to_string())
    );
    assert_eq!(form.state(), FormState::Editing);
    assert!(form.form().order_number.is_empty());
    assert!(form.form().technician.is_empty());
    assert!(form.form().photos.is_empty());
}

#[tokio::test]
async fn non_numeric_order_number_is_refused() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::answering("Santiago, Chile"),
        submitter.clone(),
    );

    form.mount().await;
    form.set_order_number("12A45");
    form.set_technician("Johan Hurtado");
    form.add_photos(vec![photo("site.jpg")]).await;

    let outcome = form.submit().await.unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Invalid(ref failures) if failures == &[ValidationFailure::NonNumericOrderNumber]
    ));
    assert!(submitter.sent().is_empty());
    assert_eq!(form.form().order_number, "12A45");
    assert_eq!(
        form.banner().message(),
        Some("The work order number must contain only digits")
    );
}

#[tokio::test]
async fn geocoder_failure_falls_back_to_coordinates() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::failing(),
        submitter.clone(),
    );

    form.mount().await;

    assert_eq!(form.location().address, "-33.450000, -70.660000");
    assert_eq!(form.location().status, LocationStatus::Resolved);
    assert_eq!(form.banner(), &StatusBanner::None);

    form.set_order_number("12345");
    form.set_technician("Luis Boada");
    form.add_photos(vec![photo("site.jpg")]).await;
    let outcome = form.submit().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Submitted));
    assert_eq!(submitter.sent()[0].address, "-33.450000, -70.660000");
}

#[tokio::test]
async fn submission_without_photos_is_refused() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::answering("Santiago, Chile"),
        submitter.clone(),
    );

    form.mount().await;
    form.set_order_number("12345");
    form.set_technician("Johan Hurtado");

    let outcome = form.submit().await.unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Invalid(ref failures) if failures == &[ValidationFailure::NoPhotos]
    ));
    assert!(form.banner().message().unwrap().contains("at least one photo"));
    assert!(submitter.sent().is_empty());
}

#[tokio::test]
async fn photos_keep_selection_order() {
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::answering("Santiago, Chile"),
        Arc::default(),
    );
    form.mount().await;

    let report = form
        .add_photos(vec![photo("1.jpg"), photo("2.jpg"), photo("3.jpg")])
        .await;

    assert!(report.rejected.is_empty());
    let names: Vec<_> = form
        .form()
        .photos
        .iter()
        .map(|p| p.original_name.clone())
        .collect();
    assert_eq!(names, vec!["1.jpg", "2.jpg", "3.jpg"]);
}

#[tokio::test]
async fn identical_photos_are_kept_separately() {
    let mut form = controller(
        Arc::new(FixedPosition::new(santiago())),
        ScriptedGeocoder::answering("Santiago, Chile"),
        Arc::default(),
    );
    form.mount().await;

    form.add_photos(vec![photo("same.jpg"), photo("same.jpg")]).await;

    assert_eq!(form.form().photos.len(), 2);
    let ids: Vec<_> = form.form().photos.iter().map(|p| p.id).collect();
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_capture_never_overwrites_newer() {
    let (sender, receiver) = EventChannel::new();
    let collaborators = Collaborators {
        position: Arc::new(FixedPosition::new(santiago())),
        geocoder: Arc::new(ScriptedGeocoder {
            answer: Ok("Santiago, Chile"),
            delay: Duration::from_secs(2),
        }),
        submitter: Arc::new(RecordingSubmitter::default()),
        watermarker: Watermarker::new(WatermarkConfig::default()).unwrap(),
    };
    let mut form = FormController::new(AppConfig::default().roster, collaborators, sender);

    let first = form.begin_location();
    let second = form.begin_location();

    let (older, newer) = tokio::join!(form.resolve_location(&first), form.resolve_location(&second));

    // Newer completes first, then the older one arrives late
    assert_eq!(form.complete_location(&second, newer), Applied::Updated);
    assert_eq!(form.complete_location(&first, older), Applied::Stale);
    assert_eq!(form.location().status, LocationStatus::Resolved);

    let discarded = receiver
        .drain()
        .into_iter()
        .any(|e| e == Event::Location(LocationEvent::Discarded { request: first.id() }));
    assert!(discarded);
}
