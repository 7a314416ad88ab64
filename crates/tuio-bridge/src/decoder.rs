//! The decoder seam and the reference UDP decoder.
//!
//! A decoder owns the network listener and turns whatever arrives into
//! per-kind entity callbacks. The bridge only talks to it through three
//! traits:
//!
//! ```text
//! DecoderFactory ──create(addr)──→ Decoder ──entity_added/updated/removed──→ EntityHandler
//! ```
//!
//! [`UdpDecoder`] is the decoder shipped here: one Tokio task reading
//! [`EntityFrame`] datagrams. A binary TUIO/OSC decoder plugs into the same
//! seam by implementing [`Decoder`] and [`DecoderFactory`].

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::task::Poll;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tuio_bridge_protocol::{
    Codec, EntityAction, EntityFrame, EntityKind, EntityMessage, JsonCodec,
    RawEntity,
};
use tuio_bridge_transport::{Transport, UdpTransport, DEFAULT_MAX_DATAGRAM_SIZE};

use crate::BridgeError;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Receives the lifecycle callbacks of one entity kind.
///
/// Called from the decoder's own context, in the order the decoder
/// observed the changes.
pub trait EntityHandler: Send + Sync + 'static {
    fn entity_added(&self, entity: &RawEntity);
    fn entity_updated(&self, entity: &RawEntity);
    fn entity_removed(&self, entity: &RawEntity);
}

/// Identifies one handler registration on a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

/// A protocol decoder bound to a listening address.
///
/// All methods are synchronous so the controller can tear a decoder down
/// from `Drop`.
pub trait Decoder: Send + 'static {
    /// Registers `handler` for the entities of `kind`.
    fn add_handler(
        &mut self,
        kind: EntityKind,
        handler: Arc<dyn EntityHandler>,
    ) -> HandlerId;

    /// Unregisters a handler. Returns `false` if the id was unknown.
    ///
    /// A callback already in progress on the decoder's context may still
    /// complete after this returns.
    fn remove_handler(&mut self, id: HandlerId) -> bool;

    /// Starts delivering callbacks.
    fn connect(&mut self) -> Result<(), BridgeError>;

    /// Stops delivering callbacks and releases the listener. Idempotent.
    fn disconnect(&mut self);

    /// The bound listening address, if the decoder has one.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// Creates decoders bound to an address.
pub trait DecoderFactory: Send + Sync + 'static {
    type Decoder: Decoder;

    /// Binds a decoder to `addr` (`host:port`).
    ///
    /// # Errors
    /// Whatever prevented the listener from starting (port in use, bad
    /// address, device unavailable).
    fn create(
        &self,
        addr: &str,
    ) -> impl Future<Output = Result<Self::Decoder, BridgeError>> + Send;
}

// ---------------------------------------------------------------------------
// UdpDecoder
// ---------------------------------------------------------------------------

struct Registration {
    id: HandlerId,
    kind: EntityKind,
    handler: Arc<dyn EntityHandler>,
}

type HandlerTable = Arc<RwLock<Vec<Registration>>>;

/// Reference decoder: one [`EntityFrame`] per UDP datagram.
///
/// `connect` spawns the receive loop on the current Tokio runtime. Messages
/// are dispatched in frame order to every handler registered for the
/// message's kind. Undecodable datagrams are logged and skipped.
///
/// The decoder holds the only strong handle on the socket; the receive loop
/// borrows it for one poll at a time. `disconnect` therefore closes the
/// socket before it returns, whether or not the runtime is still polling.
pub struct UdpDecoder<C: Codec = JsonCodec> {
    transport: Option<Arc<UdpTransport>>,
    codec: C,
    handlers: HandlerTable,
    next_id: u64,
    task: Option<JoinHandle<()>>,
}

impl<C: Codec + Clone> UdpDecoder<C> {
    pub fn new(transport: UdpTransport, codec: C) -> Self {
        Self {
            transport: Some(Arc::new(transport)),
            codec,
            handlers: Arc::new(RwLock::new(Vec::new())),
            next_id: 0,
            task: None,
        }
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_connected(&self) -> bool {
        self.task.is_some()
    }
}

impl<C: Codec + Clone> Decoder for UdpDecoder<C> {
    fn add_handler(
        &mut self,
        kind: EntityKind,
        handler: Arc<dyn EntityHandler>,
    ) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers.write().push(Registration { id, kind, handler });
        tracing::debug!(%id, %kind, "handler registered");
        id
    }

    fn remove_handler(&mut self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|r| r.id != id);
        before != handlers.len()
    }

    fn connect(&mut self) -> Result<(), BridgeError> {
        if self.task.is_some() {
            return Ok(());
        }
        let Some(transport) = &self.transport else {
            return Err(BridgeError::Decoder("listener already released".into()));
        };
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BridgeError::Decoder(e.to_string()))?;
        let transport = Arc::downgrade(transport);
        let codec = self.codec.clone();
        let handlers = Arc::clone(&self.handlers);
        self.task = Some(runtime.spawn(receive_loop(transport, codec, handlers)));
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(transport) = self.transport.take() {
            let addr = transport.local_addr().ok();
            drop(transport);
            tracing::debug!(?addr, "UDP decoder disconnected");
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.as_ref()?.local_addr().ok()
    }
}

impl<C: Codec> Drop for UdpDecoder<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Pause after the first receive error; doubles per consecutive error.
const RECV_BACKOFF_MIN: Duration = Duration::from_millis(10);
const RECV_BACKOFF_MAX: Duration = Duration::from_secs(1);

fn next_backoff(backoff: Duration) -> Duration {
    (backoff * 2).min(RECV_BACKOFF_MAX)
}

async fn receive_loop<C: Codec>(
    transport: Weak<UdpTransport>,
    codec: C,
    handlers: HandlerTable,
) {
    let mut backoff = RECV_BACKOFF_MIN;
    loop {
        let received = std::future::poll_fn(|cx| match transport.upgrade() {
            Some(transport) => transport.poll_recv(cx).map(Some),
            None => Poll::Ready(None),
        })
        .await;
        let datagram = match received {
            None => {
                tracing::debug!("listener released, receive loop stopped");
                return;
            }
            Some(Ok(datagram)) => {
                backoff = RECV_BACKOFF_MIN;
                datagram
            }
            Some(Err(e)) => {
                if backoff == RECV_BACKOFF_MIN {
                    tracing::warn!(error = %e, "UDP receive failed");
                } else {
                    tracing::debug!(error = %e, ?backoff, "UDP receive still failing");
                }
                tokio::time::sleep(backoff).await;
                backoff = next_backoff(backoff);
                continue;
            }
        };
        let frame = match EntityFrame::decode(&codec, &datagram.data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(
                    peer = %datagram.peer,
                    error = %e,
                    "skipping undecodable datagram"
                );
                continue;
            }
        };
        for message in &frame.messages {
            dispatch(&handlers, message);
        }
    }
}

/// Invokes every handler registered for the message's kind.
///
/// The table lock is released before any handler runs.
fn dispatch(handlers: &RwLock<Vec<Registration>>, message: &EntityMessage) {
    let targets: Vec<Arc<dyn EntityHandler>> = handlers
        .read()
        .iter()
        .filter(|r| r.kind == message.kind)
        .map(|r| Arc::clone(&r.handler))
        .collect();
    if targets.is_empty() {
        tracing::trace!(kind = %message.kind, "no handler for message");
    }
    for handler in targets {
        match message.action {
            EntityAction::Added => handler.entity_added(&message.entity),
            EntityAction::Updated => handler.entity_updated(&message.entity),
            EntityAction::Removed => handler.entity_removed(&message.entity),
        }
    }
}

// ---------------------------------------------------------------------------
// UdpDecoderFactory
// ---------------------------------------------------------------------------

/// Creates [`UdpDecoder`]s.
#[derive(Debug, Clone)]
pub struct UdpDecoderFactory<C: Codec = JsonCodec> {
    codec: C,
    max_datagram_size: usize,
}

impl UdpDecoderFactory<JsonCodec> {
    pub fn new(max_datagram_size: usize) -> Self {
        Self::with_codec(JsonCodec, max_datagram_size)
    }
}

impl<C: Codec> UdpDecoderFactory<C> {
    /// A factory whose decoders read frames with `codec`.
    pub fn with_codec(codec: C, max_datagram_size: usize) -> Self {
        Self {
            codec,
            max_datagram_size,
        }
    }
}

impl Default for UdpDecoderFactory<JsonCodec> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DATAGRAM_SIZE)
    }
}

impl<C: Codec + Clone> DecoderFactory for UdpDecoderFactory<C> {
    type Decoder = UdpDecoder<C>;

    async fn create(&self, addr: &str) -> Result<Self::Decoder, BridgeError> {
        let transport =
            UdpTransport::bind_with_capacity(addr, self.max_datagram_size)
                .await?;
        Ok(UdpDecoder::new(transport, self.codec.clone()))
    }
}
