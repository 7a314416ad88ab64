//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The reference decoder does not care HOW frames are serialized; it needs
//! something that implements [`Codec`]. [`JsonCodec`] is the one shipped
//! here because it is easy to produce from test rigs and tracker scripts.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the decoder runs its receive loop on a
/// spawned Tokio task that owns the codec.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns a decode error if the bytes are malformed, truncated, or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use tuio_bridge_protocol::{
///     Codec, EntityAction, EntityFrame, EntityKind, EntityMessage, JsonCodec,
///     RawEntity,
/// };
///
/// let frame = EntityFrame {
///     messages: vec![EntityMessage {
///         kind: EntityKind::Cursor,
///         action: EntityAction::Added,
///         entity: RawEntity::new(3, 0.25, 0.1),
///     }],
/// };
///
/// let bytes = JsonCodec.encode(&frame).unwrap();
/// let decoded: EntityFrame = JsonCodec.decode(&bytes).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
