//! Point types: one tracked position with a stable identity.
//!
//! A [`Point`] never changes its `kind` or `id` after construction. Its
//! position is updated in place, so every `Arc<Point>` handed out earlier
//! sees the latest position without re-querying the registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tuio_bridge_protocol::EntityKind;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A 2D position, each axis normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Packs both axes into one word so the pair is stored and loaded with a
    /// single atomic access.
    fn to_bits(self) -> u64 {
        (u64::from(self.x.to_bits()) << 32) | u64::from(self.y.to_bits())
    }

    fn from_bits(bits: u64) -> Self {
        Self {
            x: f32::from_bits((bits >> 32) as u32),
            y: f32::from_bits(bits as u32),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A tracked point.
///
/// Equality and hashing use `kind` and `id` only: two observations of the
/// same entity at different positions are the same point.
pub struct Point {
    kind: EntityKind,
    id: i32,
    position: AtomicU64,
}

impl Point {
    pub fn new(kind: EntityKind, id: i32, position: Position) -> Self {
        Self {
            kind,
            id,
            position: AtomicU64::new(position.to_bits()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Protocol id. Unique only within [`kind`](Self::kind).
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The latest position.
    pub fn position(&self) -> Position {
        Position::from_bits(self.position.load(Ordering::Acquire))
    }

    /// Moves the point. Only the registry does this.
    pub(crate) fn set_position(&self, position: Position) {
        self.position.store(position.to_bits(), Ordering::Release);
    }
}

/// Produces a detached copy holding the current position.
impl Clone for Point {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.id, self.position())
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("position", &self.position())
            .finish()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} @ {}", self.kind, self.id, self.position())
    }
}
