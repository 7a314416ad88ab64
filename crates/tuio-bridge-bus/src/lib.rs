//! Point-event delivery for tuio-bridge.
//!
//! Adapters publish [`PointEvent`]s on the [`EventBus`]. For every event the
//! bus first reconciles the [`PointRegistry`](tuio_bridge_registry::PointRegistry),
//! then queues the event on each external [`PointFeed`]. Consumers drain
//! their feed on their own loop, directly or through a [`Dispatcher`].
//!
//! # Key types
//!
//! - [`PointEvent`]: Added / Updated / Removed, carrying the point
//! - [`EventBus`]: serialized publish, registry first, then fan-out
//! - [`PointFeed`]: one subscriber's FIFO queue
//! - [`Dispatcher`]: runs per-kind handlers on the consumer's thread

mod bus;
mod dispatcher;
mod event;
mod feed;

pub use bus::EventBus;
pub use dispatcher::Dispatcher;
pub use event::{PointEvent, PointEventKind};
pub use feed::PointFeed;
