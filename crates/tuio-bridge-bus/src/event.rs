//! Point lifecycle events.

use std::fmt;
use std::sync::Arc;

use tuio_bridge_registry::Point;

/// One normalized point-lifecycle event.
///
/// For `Added`, the carried handle is the one the registry stores (unless
/// the add was a duplicate), so a subscriber keeping it observes later
/// moves. `Updated` and `Removed` carry the adapter's fresh observation.
#[derive(Debug, Clone)]
pub enum PointEvent {
    Added(Arc<Point>),
    Updated(Arc<Point>),
    Removed(Arc<Point>),
}

/// The variant of a [`PointEvent`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointEventKind {
    Added,
    Updated,
    Removed,
}

impl PointEvent {
    pub fn kind(&self) -> PointEventKind {
        match self {
            Self::Added(_) => PointEventKind::Added,
            Self::Updated(_) => PointEventKind::Updated,
            Self::Removed(_) => PointEventKind::Removed,
        }
    }

    pub fn point(&self) -> &Arc<Point> {
        match self {
            Self::Added(p) | Self::Updated(p) | Self::Removed(p) => p,
        }
    }
}

impl fmt::Display for PointEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

impl fmt::Display for PointEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.point(), self.kind())
    }
}
