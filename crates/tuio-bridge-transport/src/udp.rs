//! UDP transport implementation using `tokio::net::UdpSocket`.

use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::net::UdpSocket;

use crate::{Datagram, Transport, TransportError};

/// Largest payload a UDP datagram over IPv4 can carry.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 65_507;

/// A UDP-based [`Transport`] bound to a local port.
///
/// One receive buffer is allocated at bind time and reused for every
/// datagram; only the received bytes are copied out.
pub struct UdpTransport {
    socket: UdpSocket,
    buffer: Mutex<Vec<u8>>,
}

impl UdpTransport {
    /// Binds a new UDP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with_capacity(addr, DEFAULT_MAX_DATAGRAM_SIZE).await
    }

    /// Binds with an explicit receive buffer size. Datagrams longer than
    /// `max_datagram_size` are truncated by the OS.
    pub async fn bind_with_capacity(
        addr: &str,
        max_datagram_size: usize,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "UDP transport listening");
        Ok(Self {
            socket,
            buffer: Mutex::new(vec![0u8; max_datagram_size.max(1)]),
        })
    }

    /// Size of the receive buffer.
    pub fn max_datagram_size(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Polls for the next datagram.
    ///
    /// Lets a caller wait without borrowing the transport between polls,
    /// e.g. through a `Weak` handle that is upgraded only for the poll.
    pub fn poll_recv(
        &self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Datagram, TransportError>> {
        loop {
            match self.socket.poll_recv_ready(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    return Poll::Ready(Err(TransportError::ReceiveFailed(e)));
                }
                Poll::Ready(Ok(())) => {}
            }
            match self.try_recv() {
                Ok(Some(datagram)) => return Poll::Ready(Ok(datagram)),
                Ok(None) => continue,
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
    }

    /// Reads one datagram if one is queued. `None` when the socket would
    /// block (readiness was spurious).
    fn try_recv(&self) -> Result<Option<Datagram>, TransportError> {
        let mut buf = self.buffer.lock();
        match self.socket.try_recv_from(&mut buf[..]) {
            Ok((len, peer)) => {
                tracing::trace!(%peer, len, "received datagram");
                Ok(Some(Datagram {
                    peer,
                    data: buf[..len].to_vec(),
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(TransportError::ReceiveFailed(e)),
        }
    }
}

impl Transport for UdpTransport {
    type Error = TransportError;

    async fn recv(&self) -> Result<Datagram, Self::Error> {
        loop {
            self.socket
                .readable()
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if let Some(datagram) = self.try_recv()? {
                return Ok(datagram);
            }
        }
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
