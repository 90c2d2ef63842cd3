//! # Events Module
//!
//! Progress reporting from the form controller to any front end.
//!
//! ## Design
//! The controller publishes events through a channel; the CLI (or any
//! other UI) subscribes and renders them. The controller never renders.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut controller = FormController::new(config.roster, collaborators, sender);
//!
//! controller.mount().await;
//! for event in receiver.drain() {
//!     match event {
//!         Event::Location(LocationEvent::Resolved { address, .. }) => println!("{}", address),
//!         _ => {}
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
