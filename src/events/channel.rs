//! Event channel implementation using crossbeam-channel.
//!
//! Lets the form controller publish progress to whatever front end is
//! attached, without knowing what it is.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core library.
///
/// Cheap to clone; clones feed the same receiver.
#[derive(Clone, Debug)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event. Never blocks.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    pub fn send(&self, event: Event) {
        // Nobody listening is fine: progress reporting is optional
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Collect every event currently queued
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Unbounded event channel between the controller and a front end.
pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender nobody listens to, for tests and headless use.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LocationEvent, PhotoEvent};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Photo(PhotoEvent::BatchStarted { total: 3 }));
        });
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Photo(PhotoEvent::BatchStarted { total }) => assert_eq!(total, 3),
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Location(LocationEvent::CaptureStarted { request: 1 }));
    }

    #[test]
    fn drain_returns_events_in_order() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Location(LocationEvent::CaptureStarted { request: 1 }));
        sender.send(Event::Location(LocationEvent::Discarded { request: 1 }));

        let events = receiver.drain();
        assert_eq!(
            events,
            vec![
                Event::Location(LocationEvent::CaptureStarted { request: 1 }),
                Event::Location(LocationEvent::Discarded { request: 1 }),
            ]
        );
        assert!(receiver.try_recv().is_none());
    }
}
