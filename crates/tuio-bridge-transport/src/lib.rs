//! Transport abstraction layer for tuio-bridge.
//!
//! Tracking hardware pushes its state as fire-and-forget datagrams, so the
//! [`Transport`] trait is receive-only: wait for the next [`Datagram`],
//! report the bound address, shut down.
//!
//! # Feature Flags
//!
//! - `udp` (default): UDP listener via `tokio::net::UdpSocket`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "udp")]
mod udp;

pub use error::TransportError;
#[cfg(feature = "udp")]
pub use udp::{UdpTransport, DEFAULT_MAX_DATAGRAM_SIZE};

use std::fmt;
use std::net::SocketAddr;

/// One received datagram and the address it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Sender of the datagram.
    pub peer: SocketAddr,
    /// Payload bytes, truncated to the received length.
    pub data: Vec<u8>,
}

impl fmt::Display for Datagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes from {}", self.data.len(), self.peer)
    }
}

/// Receives datagrams from a bound socket.
pub trait Transport: Send + Sync + 'static {
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and returns the next datagram.
    async fn recv(&self) -> Result<Datagram, Self::Error>;

    /// Returns the local address the transport is bound to.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}
