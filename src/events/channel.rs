//! Crossbeam-backed event delivery.
//!
//! The channel is unbounded so the orchestrating thread never waits on
//! whoever is rendering progress.

use super::Event;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Publishing end, cloneable across threads
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Publish `event`. A receiver that has gone away is not an error: the
    /// event is simply dropped.
    pub fn send(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

/// Listening end
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Next event, waiting if needed; `None` after the last sender is dropped
    pub fn recv(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    /// Next event if one is already queued
    pub fn try_recv(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Blocking iterator that ends once every sender is gone
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.rx.iter()
    }
}

/// Factory for connected sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (tx, rx) = unbounded();
        (EventSender { tx }, EventReceiver { rx })
    }
}

/// A sender nobody listens to, for runs without progress output
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
