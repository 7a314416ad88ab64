//! Entity types: what a protocol decoder reports to the bridge.
//!
//! The sensing protocol tracks three independent kinds of entity. Each kind
//! numbers its entities on its own, so `Cursor #3` and `Object #3` are two
//! different physical things that happen to share a number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Codec, ProtocolError};

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The kind of tracked entity.
///
/// - **Blob**: an untyped contact region (palm, arbitrary shape).
/// - **Cursor**: a fingertip-style point contact.
/// - **Object**: a tagged tangible object (fiducial marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Blob,
    Cursor,
    Object,
}

impl EntityKind {
    /// All kinds, in the order adapters are registered.
    pub const ALL: [EntityKind; 3] =
        [EntityKind::Blob, EntityKind::Cursor, EntityKind::Object];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => write!(f, "Blob"),
            Self::Cursor => write!(f, "Cursor"),
            Self::Object => write!(f, "Object"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawEntity
// ---------------------------------------------------------------------------

/// An entity as the decoder reports it.
///
/// `x` and `y` are normalized to `[0, 1]` with the origin at the top-left
/// corner of the sensing surface (protocol convention). Values are passed
/// through untouched; range checks are not this layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Session id, unique only within the entity's kind.
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

impl RawEntity {
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

// ---------------------------------------------------------------------------
// EntityAction / EntityMessage / EntityFrame
// ---------------------------------------------------------------------------

/// Which lifecycle callback a message maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityAction {
    Added,
    Updated,
    Removed,
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// One entity notification: "this kind of entity was added/updated/removed".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityMessage {
    pub kind: EntityKind,
    pub action: EntityAction,
    pub entity: RawEntity,
}

/// A batch of notifications carried by one datagram, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityFrame {
    pub messages: Vec<EntityMessage>,
}

impl EntityFrame {
    /// Decodes a frame from one datagram payload.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for an empty payload, otherwise
    /// whatever the codec reports.
    pub fn decode<C: Codec>(
        codec: &C,
        data: &[u8],
    ) -> Result<Self, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::InvalidMessage("empty datagram".into()));
        }
        codec.decode(data)
    }

    /// Encodes the frame into a datagram payload.
    pub fn encode<C: Codec>(&self, codec: &C) -> Result<Vec<u8>, ProtocolError> {
        codec.encode(self)
    }
}
