//! Bridge configuration.

use serde::{Deserialize, Serialize};
use tuio_bridge_registry::{IdentityPolicy, Position};
use tuio_bridge_transport::DEFAULT_MAX_DATAGRAM_SIZE;

// ---------------------------------------------------------------------------
// CoordinateConvention
// ---------------------------------------------------------------------------

/// Where the origin of the published positions sits.
///
/// The tracking protocol reports positions with the origin at the top-left
/// of the surface and y growing downward. Most scene graphs put the origin
/// at the bottom-left with y growing upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateConvention {
    /// `(x, 1 - y)`: origin bottom-left, y up.
    #[default]
    BottomLeft,
    /// `(x, y)`: the protocol's own convention, passed through.
    TopLeft,
}

impl CoordinateConvention {
    /// Maps a raw protocol position into this convention.
    pub fn apply(self, x: f32, y: f32) -> Position {
        match self {
            Self::BottomLeft => Position::new(x, 1.0 - y),
            Self::TopLeft => Position::new(x, y),
        }
    }
}

// ---------------------------------------------------------------------------
// BridgeConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`TuioServer`](crate::TuioServer).
///
/// Usually set through [`TuioServerBuilder`](crate::TuioServerBuilder), but
/// it is also `Deserialize` so it can be loaded from an application's
/// settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Port used by `open_default()`.
    pub port: u16,

    /// Host/interface the listener binds to.
    pub bind_host: String,

    /// Coordinate convention applied to every entity kind.
    pub convention: CoordinateConvention,

    /// How the registry keys points.
    pub identity: IdentityPolicy,

    /// Receive buffer size for one datagram.
    pub max_datagram_size: usize,
}

impl BridgeConfig {
    /// The conventional TUIO port.
    pub const DEFAULT_PORT: u16 = 3333;

    /// Smallest accepted receive buffer.
    pub const MIN_DATAGRAM_SIZE: usize = 512;

    /// Validates and clamps values to safe ranges.
    ///
    /// Called by the builder before the server is created. Rules:
    /// - `max_datagram_size` clamped to `MIN_DATAGRAM_SIZE..=65_507`.
    /// - An empty `bind_host` falls back to `0.0.0.0`.
    pub fn validated(mut self) -> Self {
        let clamped = self
            .max_datagram_size
            .clamp(Self::MIN_DATAGRAM_SIZE, DEFAULT_MAX_DATAGRAM_SIZE);
        if clamped != self.max_datagram_size {
            tracing::warn!(
                requested = self.max_datagram_size,
                clamped,
                "max_datagram_size out of range, clamping"
            );
            self.max_datagram_size = clamped;
        }
        if self.bind_host.trim().is_empty() {
            self.bind_host = "0.0.0.0".to_string();
        }
        self
    }

    /// The socket address string for `port` on the configured host.
    pub fn bind_addr(&self, port: u16) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{port}", self.bind_host)
        } else {
            format!("{}:{port}", self.bind_host)
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            bind_host: "0.0.0.0".to_string(),
            convention: CoordinateConvention::default(),
            identity: IdentityPolicy::default(),
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
        }
    }
}
