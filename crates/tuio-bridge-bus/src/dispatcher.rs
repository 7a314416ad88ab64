//! Consumer-side dispatch: run point handlers on the consumer's own loop.
//!
//! The decoder thread only queues events. A [`Dispatcher`] owned by the
//! consumer drains that queue and calls its handlers on whatever thread
//! calls [`pump`](Dispatcher::pump), typically once per frame of a
//! render/UI loop. [`run`](Dispatcher::run) is the async equivalent for a
//! consumer that lives in a Tokio task.

use std::sync::Arc;

use tuio_bridge_registry::Point;

use crate::{PointEvent, PointFeed};

type Handler = Box<dyn FnMut(&Arc<Point>) + Send>;

/// Routes events from one [`PointFeed`] to per-kind handlers.
///
/// Handlers for the same kind run in registration order; events run in
/// feed order.
///
/// ```rust
/// use std::sync::Arc;
/// use tuio_bridge_bus::{Dispatcher, EventBus, PointEvent};
/// use tuio_bridge_protocol::EntityKind;
/// use tuio_bridge_registry::{Point, PointRegistry, Position};
///
/// let bus = EventBus::new(Arc::new(PointRegistry::default()));
/// let mut dispatcher = Dispatcher::new(bus.subscribe())
///     .on_added(|p| println!("down {p}"))
///     .on_removed(|p| println!("up {p}"));
///
/// bus.publish(PointEvent::Added(Arc::new(Point::new(
///     EntityKind::Cursor,
///     1,
///     Position::new(0.5, 0.5),
/// ))));
///
/// // Once per frame:
/// assert_eq!(dispatcher.pump(), 1);
/// ```
pub struct Dispatcher {
    feed: PointFeed,
    added: Vec<Handler>,
    updated: Vec<Handler>,
    removed: Vec<Handler>,
}

impl Dispatcher {
    pub fn new(feed: PointFeed) -> Self {
        Self {
            feed,
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn on_added(
        mut self,
        handler: impl FnMut(&Arc<Point>) + Send + 'static,
    ) -> Self {
        self.added.push(Box::new(handler));
        self
    }

    pub fn on_updated(
        mut self,
        handler: impl FnMut(&Arc<Point>) + Send + 'static,
    ) -> Self {
        self.updated.push(Box::new(handler));
        self
    }

    pub fn on_removed(
        mut self,
        handler: impl FnMut(&Arc<Point>) + Send + 'static,
    ) -> Self {
        self.removed.push(Box::new(handler));
        self
    }

    /// Dispatches every event queued right now, without waiting.
    ///
    /// Returns the number of events dispatched.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.feed.try_recv() {
            self.dispatch(&event);
            count += 1;
        }
        count
    }

    /// Dispatches events as they arrive until the feed ends.
    pub async fn run(mut self) {
        while let Some(event) = self.feed.recv().await {
            self.dispatch(&event);
        }
        tracing::debug!("point feed ended, dispatcher stopped");
    }

    fn dispatch(&mut self, event: &PointEvent) {
        let handlers = match event {
            PointEvent::Added(_) => &mut self.added,
            PointEvent::Updated(_) => &mut self.updated,
            PointEvent::Removed(_) => &mut self.removed,
        };
        for handler in handlers.iter_mut() {
            handler(event.point());
        }
    }
}
