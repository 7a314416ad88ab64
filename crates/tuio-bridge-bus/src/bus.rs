//! The event bus: serialized publish with registry-first delivery.
//!
//! ```text
//! adapter ──publish──→ EventBus ──1──→ PointRegistry (reconcile)
//!                          │
//!                          └──2──→ PointFeed, PointFeed, ... (queued)
//! ```
//!
//! Step 1 always completes before step 2, so a consumer that reacts to an
//! event by taking a registry snapshot sees that event applied.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tuio_bridge_registry::PointRegistry;

use crate::{PointEvent, PointEventKind, PointFeed};

/// An external subscriber: its queue and the event kind it wants
/// (`None` = all kinds).
struct Subscriber {
    filter: Option<PointEventKind>,
    sender: mpsc::UnboundedSender<PointEvent>,
}

impl Subscriber {
    fn wants(&self, kind: PointEventKind) -> bool {
        self.filter.is_none_or(|f| f == kind)
    }
}

struct BusState {
    subscribers: Vec<Subscriber>,
    closed: bool,
}

/// Delivers point events to the registry and then to subscribers.
///
/// `publish` holds the bus lock for the whole delivery. That serializes
/// concurrent publishers, which is what keeps each id's
/// add → update* → remove sequence in order on every feed, and it makes
/// [`close`](Self::close) wait for an in-flight publish to finish.
pub struct EventBus {
    registry: Arc<PointRegistry>,
    state: Mutex<BusState>,
}

impl EventBus {
    /// Creates a bus whose reconciliation step writes to `registry`.
    pub fn new(registry: Arc<PointRegistry>) -> Self {
        Self {
            registry,
            state: Mutex::new(BusState {
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<PointRegistry> {
        &self.registry
    }

    /// Publishes one event.
    ///
    /// Reconciles the registry, then queues the event for every interested
    /// subscriber. Never blocks on a subscriber. Subscribers whose feed was
    /// dropped are pruned here. Returns `false` if the bus is closed (the
    /// event is discarded).
    pub fn publish(&self, event: PointEvent) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            tracing::trace!(%event, "bus closed, dropping event");
            return false;
        }

        reconcile(&self.registry, &event);

        let kind = event.kind();
        state.subscribers.retain(|sub| {
            if sub.wants(kind) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                !sub.sender.is_closed()
            }
        });
        tracing::trace!(%event, subscribers = state.subscribers.len(), "published");
        true
    }

    /// Subscribes to every event kind.
    pub fn subscribe(&self) -> PointFeed {
        self.add_subscriber(None)
    }

    /// Subscribes to one event kind.
    pub fn subscribe_to(&self, kind: PointEventKind) -> PointFeed {
        self.add_subscriber(Some(kind))
    }

    fn add_subscriber(&self, filter: Option<PointEventKind>) -> PointFeed {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        // After close the sender is dropped here, so the feed is born ended.
        if !state.closed {
            state.subscribers.push(Subscriber { filter, sender });
        }
        PointFeed::new(receiver)
    }

    /// Number of registered external subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Closes the bus. Terminal and idempotent.
    ///
    /// Drops every subscriber sender, so feeds end after delivering what
    /// is already queued. Later `publish` calls are no-ops. The registry
    /// is not touched; its owner closes it separately.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let released = state.subscribers.len();
        state.subscribers.clear();
        tracing::debug!(released, "event bus closed");
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// The internal subscriber: applies one event to the registry.
fn reconcile(registry: &PointRegistry, event: &PointEvent) {
    match event {
        PointEvent::Added(point) => {
            registry.upsert_add(Arc::clone(point));
        }
        PointEvent::Updated(point) => {
            registry.apply_update(point);
        }
        PointEvent::Removed(point) => {
            registry.remove(point.kind(), point.id());
        }
    }
}
