//! # CLI Module
//!
//! Command-line interface for work order capture.
//!
//! ## Usage
//! ```bash
//! # Stamp photos and send the work order
//! wo-stamp submit --order 12345 --technician "Luis Boada" site-1.jpg site-2.jpg
//!
//! # Position from the command line instead of the photos' GPS tags
//! wo-stamp submit --order 12345 --technician "Luis Boada" --lat -33.45 --lng -70.66 site.jpg
//!
//! # Stamp only, writing JPEGs to a directory
//! wo-stamp stamp site-1.jpg --out stamped/
//!
//! # Show the technician roster / effective configuration
//! wo-stamp roster
//! wo-stamp config --init
//! ```

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use work_order_stamp::core::form::{Collaborators, FormController, StatusBanner, SubmitOutcome};
use work_order_stamp::core::geocode::{CoordinatesOnly, NominatimGeocoder, ReverseGeocoder};
use work_order_stamp::core::location::{
    Coordinate, ExifPosition, FixedPosition, LocationContext, LocationProvider, PositionSource,
    Unavailable,
};
use work_order_stamp::core::photos::{read_selection, PhotoIntake, RejectedPhoto};
use work_order_stamp::core::submission::{HttpSubmitter, SubmissionPayload, Submitter};
use work_order_stamp::core::watermark::{Caption, Watermarker};
use work_order_stamp::error::{Result, SubmitError, WorkOrderError};
use work_order_stamp::events::{
    Event, EventChannel, EventReceiver, FormEvent, LocationEvent, PhotoEvent, SubmissionEvent,
};
use work_order_stamp::AppConfig;

/// Work Order Stamp - GPS-stamped site photos for field work orders
#[derive(Parser, Debug)]
#[command(name = "wo-stamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stamp photos and submit a work order
    Submit {
        /// Work order number (digits only)
        #[arg(short, long)]
        order: String,

        /// Technician name, as listed by `wo-stamp roster`
        #[arg(short, long)]
        technician: String,

        /// Site photos, in the order they should appear
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// Collection endpoint (overrides the config file)
        #[arg(long)]
        endpoint: Option<String>,

        /// Replace the resolved address
        #[arg(long)]
        address: Option<String>,

        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        position: PositionArgs,
    },

    /// Stamp photos and write them to a directory
    Stamp {
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "stamped")]
        out: PathBuf,

        /// Replace the resolved address
        #[arg(long)]
        address: Option<String>,

        #[command(flatten)]
        position: PositionArgs,
    },

    /// List the technicians who can be selected
    Roster,

    /// Show the effective configuration
    Config {
        /// Write the defaults to the config path if no file exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug)]
struct PositionArgs {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Skip reverse geocoding; the address becomes the coordinates
    #[arg(long)]
    offline: bool,
}

impl PositionArgs {
    /// Explicit coordinates win; otherwise the first photo's GPS tags
    fn source(&self, photos: &[PathBuf]) -> Arc<dyn PositionSource> {
        match (self.lat, self.lng, photos.first()) {
            (Some(lat), Some(lng), _) => Arc::new(FixedPosition::new(Coordinate::new(lat, lng))),
            (_, _, Some(first)) => Arc::new(ExifPosition::new(first)),
            _ => Arc::new(Unavailable),
        }
    }

    fn geocoder(&self, config: &AppConfig) -> Result<Arc<dyn ReverseGeocoder>> {
        if self.offline {
            Ok(Arc::new(CoordinatesOnly))
        } else {
            Ok(Arc::new(NominatimGeocoder::new(config.geocoder_config())?))
        }
    }
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    work_order_stamp::init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Submit {
            order,
            technician,
            photos,
            endpoint,
            address,
            dry_run,
            position,
        } => {
            if let Some(endpoint) = endpoint {
                config.endpoint_url = endpoint;
                config.validate()?;
            }
            let request = SubmitRequest {
                order,
                technician,
                photos,
                address,
                dry_run,
            };
            run_submit(&config, request, &position, cli.verbose).await
        }
        Commands::Stamp {
            photos,
            out,
            address,
            position,
        } => run_stamp(&config, photos, &out, address, &position).await,
        Commands::Roster => {
            print_roster(&config);
            Ok(())
        }
        Commands::Config { init } => show_config(&config, cli.config.as_deref(), init),
    }
}

struct SubmitRequest {
    order: String,
    technician: String,
    photos: Vec<PathBuf>,
    address: Option<String>,
    dry_run: bool,
}

async fn run_submit(
    config: &AppConfig,
    request: SubmitRequest,
    position: &PositionArgs,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term);

    let submitter: Arc<dyn Submitter> = if request.dry_run {
        Arc::new(StdoutSubmitter)
    } else {
        Arc::new(HttpSubmitter::new(
            config.require_endpoint()?,
            config.request_timeout(),
        )?)
    };

    let collaborators = Collaborators {
        position: position.source(&request.photos),
        geocoder: position.geocoder(config)?,
        submitter,
        watermarker: Watermarker::new(config.watermark.clone())?,
    };

    let (files, unreadable) = read_selection(&request.photos);
    print_rejected(&term, &unreadable);

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_renderer(receiver, verbose);

    let mut controller = FormController::new(config.roster.clone(), collaborators, sender)
        .with_fix_options(config.fix_options());

    controller.mount().await;
    if let Some(address) = request.address {
        controller.set_address(address);
    }
    controller.set_order_number(request.order);
    controller.set_technician(request.technician);
    controller.add_photos(files).await;

    let location = controller.location().clone();
    let outcome = controller
        .submit()
        .await
        .map_err(|e| WorkOrderError::Validation(e.to_string()))?;
    let banner = controller.banner().clone();

    // Dropping the controller closes the channel and ends the renderer
    drop(controller);
    event_thread.join().ok();

    print_location(&term, &location);
    print_banner(&term, &banner);

    match outcome {
        SubmitOutcome::Submitted => Ok(()),
        SubmitOutcome::Invalid(failures) => Err(WorkOrderError::Validation(
            failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )),
        SubmitOutcome::Failed(e) => Err(e.into()),
    }
}

async fn run_stamp(
    config: &AppConfig,
    photos: Vec<PathBuf>,
    out: &Path,
    address: Option<String>,
    position: &PositionArgs,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term);

    let mut provider = LocationProvider::new(position.source(&photos), position.geocoder(config)?)
        .with_options(config.fix_options());
    let mut location = LocationContext::loading();
    let ticket = provider.begin(&mut location);
    let outcome = provider.resolve(&ticket).await;
    provider.apply(&ticket, &outcome, &mut location);
    if let Some(address) = address {
        location.set_address(address);
    }
    print_location(&term, &location);

    let watermarker = Watermarker::new(config.watermark.clone())?;
    let caption = Caption::for_location(
        &location,
        &chrono::Local::now(),
        &watermarker.config().date_format,
    );
    let intake = PhotoIntake::new(watermarker);

    let (files, unreadable) = read_selection(&photos);
    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_renderer(receiver, false);
    let report = intake.annotate_batch(files, &caption, &sender).await;
    drop(sender);
    event_thread.join().ok();

    std::fs::create_dir_all(out).map_err(|e| WorkOrderError::Output {
        path: out.to_path_buf(),
        source: e,
    })?;

    for (position, photo) in report.accepted.iter().enumerate() {
        let target = out.join(photo.stamped_file_name(position));
        std::fs::write(&target, photo.image_data()).map_err(|e| WorkOrderError::Output {
            path: target.clone(),
            source: e,
        })?;
        term.write_line(&format!("  {} {}", style("✓").green(), target.display()))
            .ok();
    }
    print_rejected(&term, &unreadable);
    print_rejected(&term, &report.rejected);

    Ok(())
}

fn print_rejected(term: &Term, rejected: &[RejectedPhoto]) {
    for photo in rejected {
        term.write_line(&format!(
            "  {} {}: {}",
            style("✗").red(),
            photo.name,
            style(&photo.reason).dim()
        ))
        .ok();
    }
}

/// Render controller events on a spinner from a separate thread
fn spawn_renderer(receiver: EventReceiver, verbose: bool) -> thread::JoinHandle<()> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Location(LocationEvent::CaptureStarted { .. }) => {
                    spinner.set_message("Getting location...");
                }
                Event::Location(LocationEvent::FixObtained { coordinate, .. }) => {
                    spinner.set_message(format!("Resolving address for {}", coordinate));
                }
                Event::Location(LocationEvent::Failed { message, .. }) => {
                    spinner.println(format!("  {} {}", style("!").yellow(), message));
                }
                Event::Photo(PhotoEvent::BatchStarted { total }) => {
                    spinner.set_message(format!("Stamping {} photo(s)...", total));
                }
                Event::Photo(PhotoEvent::Stamped { name, .. }) if verbose => {
                    spinner.println(format!("  {} {}", style("stamped").dim(), name));
                }
                Event::Photo(PhotoEvent::Rejected { name, reason, .. }) => {
                    spinner.println(format!("  {} {}: {}", style("✗").red(), name, reason));
                }
                Event::Submission(SubmissionEvent::Started { order_number, photos }) => {
                    spinner.set_message(format!(
                        "Sending work order {} with {} photo(s)...",
                        order_number, photos
                    ));
                }
                Event::Form(FormEvent::StateChanged { state }) if verbose => {
                    spinner.println(format!("  {} {}", style("state").dim(), state));
                }
                _ => {}
            }
        }
        spinner.finish_and_clear();
    })
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Work Order Stamp").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_location(term: &Term, location: &LocationContext) {
    match location.coordinate {
        Some(coordinate) => {
            term.write_line(&format!(
                "  {} {}",
                style("Location:").bold(),
                style(&location.address).cyan()
            ))
            .ok();
            term.write_line(&format!("            {}", style(coordinate).dim()))
                .ok();
        }
        None => {
            term.write_line(&format!(
                "  {} {}",
                style("Location:").bold(),
                style("not captured").yellow()
            ))
            .ok();
        }
    }
}

fn print_banner(term: &Term, banner: &StatusBanner) {
    match banner {
        StatusBanner::Success(message) => {
            term.write_line(&format!("{} {}", style("✓").green().bold(), message))
                .ok();
        }
        StatusBanner::Error(message) => {
            for line in message.lines() {
                term.write_line(&format!("{} {}", style("✗").red().bold(), line))
                    .ok();
            }
        }
        StatusBanner::None => {}
    }
}

fn print_roster(config: &AppConfig) {
    for (i, name) in config.roster.iter().enumerate() {
        println!("{:>2}. {}", i + 1, name);
    }
}

fn show_config(config: &AppConfig, explicit: Option<&Path>, init: bool) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path);

    if init && !path.exists() {
        config.save(&path)?;
        eprintln!("{} wrote {}", style("✓").green(), path.display());
    } else {
        eprintln!("{} {}", style("Config:").bold(), path.display());
    }

    let json = serde_json::to_string_pretty(config).map_err(|e| WorkOrderError::Serialize {
        what: "config",
        reason: e.to_string(),
    })?;
    println!("{}", json);
    Ok(())
}

/// Prints the payload as JSON instead of sending it
struct StdoutSubmitter;

#[async_trait]
impl Submitter for StdoutSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> std::result::Result<(), SubmitError> {
        let json =
            serde_json::to_string_pretty(payload).map_err(|e| SubmitError::Serialize(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }

    fn destination(&self) -> &str {
        "stdout"
    }
}
