//! Pending-event buffer.

use parking_lot::Mutex;
use pixel_core::RawEvent;

/// Events tracked since the last flush.
///
/// [`EventQueue::take`] swaps the whole buffer out under the lock, so an
/// event tracked while a send is in flight lands in the next batch and is
/// never sent twice.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<Vec<RawEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: RawEvent) {
        self.events.lock().push(event);
    }

    /// Empties the queue and returns what it held.
    pub fn take(&self) -> Vec<RawEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}
