//! `TuioServer` builder and lifecycle controller.
//!
//! This is the entry point of the bridge. It ties the layers together:
//! decoder → adapters → bus → registry, and owns the teardown order.
//!
//! ```text
//! Closed ──open()──→ Open ──dispose()──→ Disposed
//!    └──────────────dispose()───────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tuio_bridge_bus::{EventBus, PointEventKind, PointFeed};
use tuio_bridge_protocol::{EntityKind, JsonCodec};
use tuio_bridge_registry::{IdentityPolicy, Point, PointRegistry};

use crate::adapter::EntityAdapter;
use crate::config::{BridgeConfig, CoordinateConvention};
use crate::decoder::{Decoder, DecoderFactory, HandlerId, UdpDecoderFactory};
use crate::BridgeError;

/// Builder for configuring a [`TuioServer`].
///
/// # Example
///
/// ```rust,no_run
/// use tuio_bridge::prelude::*;
///
/// # async fn example() -> Result<(), BridgeError> {
/// let mut server = TuioServer::builder()
///     .port(3333)
///     .convention(CoordinateConvention::BottomLeft)
///     .build();
/// server.open_default().await?;
/// for point in server.points() {
///     println!("{point}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TuioServerBuilder {
    config: BridgeConfig,
}

impl TuioServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the port used by `open_default()`.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the host/interface to listen on.
    pub fn bind_host(mut self, host: &str) -> Self {
        self.config.bind_host = host.to_string();
        self
    }

    pub fn convention(mut self, convention: CoordinateConvention) -> Self {
        self.config.convention = convention;
        self
    }

    pub fn identity(mut self, identity: IdentityPolicy) -> Self {
        self.config.identity = identity;
        self
    }

    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a server that listens with the reference UDP decoder.
    ///
    /// Nothing is bound until [`TuioServer::open`].
    pub fn build(self) -> TuioServer {
        let config = self.config.validated();
        let factory = UdpDecoderFactory::new(config.max_datagram_size);
        TuioServer::with_parts(config, factory)
    }

    /// Builds a server that creates its decoder through `factory`.
    pub fn build_with<F: DecoderFactory>(self, factory: F) -> TuioServer<F> {
        TuioServer::with_parts(self.config.validated(), factory)
    }
}

enum Lifecycle<D> {
    Closed,
    Open {
        decoder: D,
        registrations: Vec<HandlerId>,
    },
    Disposed,
}

/// Owns the decoder, the adapters, the event bus and the point registry.
///
/// Dropping the server disposes it.
pub struct TuioServer<F: DecoderFactory = UdpDecoderFactory<JsonCodec>> {
    config: BridgeConfig,
    factory: F,
    registry: Arc<PointRegistry>,
    bus: Arc<EventBus>,
    lifecycle: Lifecycle<F::Decoder>,
}

impl TuioServer {
    /// Creates a new builder.
    pub fn builder() -> TuioServerBuilder {
        TuioServerBuilder::new()
    }
}

impl<F: DecoderFactory> TuioServer<F> {
    fn with_parts(config: BridgeConfig, factory: F) -> Self {
        let registry = Arc::new(PointRegistry::new(config.identity));
        let bus = Arc::new(EventBus::new(Arc::clone(&registry)));
        Self {
            config,
            factory,
            registry,
            bus,
            lifecycle: Lifecycle::Closed,
        }
    }

    /// Starts listening on `port`.
    ///
    /// Creates the decoder, registers one adapter per entity kind and
    /// connects. A no-op if already open.
    ///
    /// # Errors
    /// - [`BridgeError::Disposed`] after [`dispose`](Self::dispose).
    /// - Whatever the decoder reports when it cannot bind or connect. The
    ///   server then stays closed and may be opened again.
    pub async fn open(&mut self, port: u16) -> Result<(), BridgeError> {
        match self.lifecycle {
            Lifecycle::Disposed => return Err(BridgeError::Disposed),
            Lifecycle::Open { .. } => {
                tracing::debug!(port, "server already open, ignoring");
                return Ok(());
            }
            Lifecycle::Closed => {}
        }

        let addr = self.config.bind_addr(port);
        let mut decoder = self.factory.create(&addr).await?;

        let registrations: Vec<HandlerId> = EntityKind::ALL
            .iter()
            .map(|&kind| {
                let adapter = EntityAdapter::new(
                    kind,
                    self.config.convention,
                    Arc::clone(&self.bus),
                );
                decoder.add_handler(kind, Arc::new(adapter))
            })
            .collect();

        if let Err(e) = decoder.connect() {
            for id in registrations {
                decoder.remove_handler(id);
            }
            tracing::warn!(%addr, error = %e, "decoder failed to connect");
            return Err(e);
        }

        tracing::info!(%addr, local_addr = ?decoder.local_addr(), "TUIO server opened");
        self.lifecycle = Lifecycle::Open {
            decoder,
            registrations,
        };
        Ok(())
    }

    /// Starts listening on the configured port (3333 unless changed).
    pub async fn open_default(&mut self) -> Result<(), BridgeError> {
        self.open(self.config.port).await
    }

    /// Tears the server down. Terminal and idempotent.
    ///
    /// Order: unregister adapters, disconnect the decoder, close the bus,
    /// close the registry. A decoder callback still in flight afterwards
    /// hits the closed bus and changes nothing.
    pub fn dispose(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
            Lifecycle::Disposed => return,
            Lifecycle::Open {
                mut decoder,
                registrations,
            } => {
                for id in registrations {
                    decoder.remove_handler(id);
                }
                decoder.disconnect();
            }
            Lifecycle::Closed => {}
        }
        self.bus.close();
        self.registry.close();
        tracing::info!("TUIO server disposed");
    }

    /// A snapshot of the points currently tracked.
    pub fn points(&self) -> Vec<Arc<Point>> {
        self.registry.snapshot()
    }

    pub fn point_count(&self) -> usize {
        self.registry.len()
    }

    /// A shareable read handle on the registry.
    pub fn registry(&self) -> Arc<PointRegistry> {
        Arc::clone(&self.registry)
    }

    /// Subscribes to every point event.
    pub fn subscribe(&self) -> PointFeed {
        self.bus.subscribe()
    }

    pub fn on_point_added(&self) -> PointFeed {
        self.bus.subscribe_to(PointEventKind::Added)
    }

    pub fn on_point_updated(&self) -> PointFeed {
        self.bus.subscribe_to(PointEventKind::Updated)
    }

    pub fn on_point_removed(&self) -> PointFeed {
        self.bus.subscribe_to(PointEventKind::Removed)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Open { .. })
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Disposed)
    }

    /// The decoder's bound address while open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.lifecycle {
            Lifecycle::Open { decoder, .. } => decoder.local_addr(),
            _ => None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl<F: DecoderFactory> Drop for TuioServer<F> {
    fn drop(&mut self) {
        self.dispose();
    }
}
