/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed (port in use, bad address, ...).
    #[error("bind to {addr} failed: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Receiving a datagram failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
