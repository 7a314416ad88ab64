//! Subscriber feeds: the consumer end of the bus.

use tokio::sync::mpsc;

use crate::PointEvent;

/// One subscriber's queue of point events, in publish order.
///
/// The bus never waits for a feed: events queue up until the consumer
/// drains them. The feed ends (`recv` returns `None`) once the bus is
/// closed and the queue is empty.
#[derive(Debug)]
pub struct PointFeed {
    receiver: mpsc::UnboundedReceiver<PointEvent>,
}

impl PointFeed {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<PointEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event. `None` once the bus closed and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<PointEvent> {
        self.receiver.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for plain threads.
    ///
    /// # Panics
    /// Panics if called from inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<PointEvent> {
        self.receiver.blocking_recv()
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<PointEvent> {
        self.receiver.try_recv().ok()
    }

    /// Takes every event queued right now.
    pub fn drain(&mut self) -> Vec<PointEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
