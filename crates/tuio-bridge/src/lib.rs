//! # tuio-bridge
//!
//! Bridges tangible-interface tracking events into one thread-safe point
//! registry.
//!
//! A tracking surface reports three kinds of entity (blobs, cursors,
//! objects), each with its own add/update/remove callbacks. The bridge
//! turns all of them into a single stream of [`PointEvent`]s and keeps a
//! [`PointRegistry`] of the points that exist right now.
//!
//! ```text
//! Decoder ──callbacks──→ EntityAdapter ×3 ──publish──→ EventBus
//!                                                        │
//!                         PointRegistry ←──reconcile─────┤
//!                                                        └──→ PointFeed ×n
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tuio_bridge::prelude::*;
//!
//! # async fn example() -> Result<(), BridgeError> {
//! let mut server = TuioServer::builder().port(3333).build();
//! server.open_default().await?;
//!
//! let mut dispatcher = Dispatcher::new(server.subscribe())
//!     .on_added(|p| println!("down {p}"))
//!     .on_removed(|p| println!("up {p}"));
//!
//! // Once per frame of the render loop:
//! dispatcher.pump();
//! let points = server.points();
//! # drop(points);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod config;
mod decoder;
mod error;
mod server;

pub use adapter::EntityAdapter;
pub use config::{BridgeConfig, CoordinateConvention};
pub use decoder::{
    Decoder, DecoderFactory, EntityHandler, HandlerId, UdpDecoder,
    UdpDecoderFactory,
};
pub use error::BridgeError;
pub use server::{TuioServer, TuioServerBuilder};

pub use tuio_bridge_bus::{Dispatcher, EventBus, PointEvent, PointEventKind, PointFeed};
pub use tuio_bridge_protocol::{
    Codec, EntityAction, EntityFrame, EntityKind, EntityMessage, JsonCodec,
    ProtocolError, RawEntity,
};
pub use tuio_bridge_registry::{IdentityPolicy, Point, PointRegistry, Position};
pub use tuio_bridge_transport::TransportError;

/// The types most applications need.
pub mod prelude {
    pub use crate::{
        BridgeConfig, BridgeError, CoordinateConvention, Dispatcher,
        EntityKind, IdentityPolicy, Point, PointEvent, PointEventKind,
        PointFeed, Position, TuioServer,
    };
}
