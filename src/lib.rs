//! # Work Order Stamp
//!
//! Field work order capture: a technician enters an order number, picks
//! their name, attaches site photos and sends the lot to a collection
//! endpoint. Every photo is stamped with where and when it was added.
//!
//! ## Core Philosophy
//! - **Evidence on the pixels** - address, coordinates and time are burned
//!   into each photo, not kept as metadata that can be stripped
//! - **Degrade, don't block** - a failed address lookup falls back to the
//!   raw coordinates
//! - **Never lose input** - a failed submission leaves the form intact
//!
//! ## Architecture
//! - `core` - The work order engine
//! - `events` - Event-driven progress reporting
//! - `config` - Settings file
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use error::{Result, WorkOrderError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// wins when set; otherwise `verbose` picks between `debug` and `warn`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "work_order_stamp=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
