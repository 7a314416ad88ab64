//! Unified error type for tuio-bridge.

use tuio_bridge_protocol::ProtocolError;
use tuio_bridge_transport::TransportError;

/// Top-level error that wraps the crate-specific errors.
///
/// The `#[from]` attribute on the wrapped variants generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A transport-level error (bind, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server was disposed and cannot be opened again.
    #[error("server has been disposed")]
    Disposed,

    /// A third-party decoder failed to start.
    #[error("decoder failed: {0}")]
    Decoder(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::BindFailed {
            addr: "0.0.0.0:3333".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken"),
        };
        let bridge_err: BridgeError = err.into();
        assert!(matches!(bridge_err, BridgeError::Transport(_)));
        assert!(bridge_err.to_string().contains("0.0.0.0:3333"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let bridge_err: BridgeError = err.into();
        assert!(matches!(bridge_err, BridgeError::Protocol(_)));
        assert!(bridge_err.to_string().contains("bad"));
    }

    #[test]
    fn test_decoder_error_message() {
        let err = BridgeError::Decoder("no device".into());
        assert_eq!(err.to_string(), "decoder failed: no device");
    }
}
