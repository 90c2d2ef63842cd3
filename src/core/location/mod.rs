//! # Location Module
//!
//! Captures where the work was done.
//!
//! ## Flow
//! 1. `begin` issues a ticket and marks the context as loading
//! 2. `fix` asks the [`PositionSource`] for a fresh position (10 s timeout)
//! 3. `lookup_address` reverse geocodes it, falling back to "lat, lng"
//! 4. `apply_*` writes the result, unless a newer ticket exists
//!
//! Step 4 is what keeps a slow, superseded request from overwriting the
//! result of a manual refresh.

mod provider;
mod source;
mod types;

pub use provider::{Applied, LocationOutcome, LocationProvider, LocationTicket, ResolvedAddress};
pub use source::{ExifPosition, FixOptions, FixedPosition, PositionSource, Unavailable};
pub use types::{Coordinate, LocationContext, LocationStatus};
