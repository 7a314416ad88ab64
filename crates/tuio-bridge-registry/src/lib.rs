//! Point model and registry for tuio-bridge.
//!
//! 1. **Points**: a tracked position with stable identity ([`Point`])
//! 2. **Registry**: the single source of truth for which points exist
//!    right now ([`PointRegistry`]), keyed per [`IdentityPolicy`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Bus (above)       ← reconciles every point event into the registry
//!     ↕
//! Registry (this crate)  ← owns current points, serves snapshots
//!     ↕
//! Protocol (below)  ← provides EntityKind
//! ```

mod point;
mod registry;

pub use point::{Point, Position};
pub use registry::{IdentityPolicy, PointRegistry, RegistryKey};
