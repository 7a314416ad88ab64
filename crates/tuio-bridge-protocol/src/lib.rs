//! Entity protocol for tuio-bridge.
//!
//! This crate defines what a decoder hands to the bridge:
//!
//! - **Types** ([`EntityKind`], [`RawEntity`], [`EntityMessage`],
//!   [`EntityFrame`]): the three tracked entity kinds and their
//!   add/update/remove notifications.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are converted
//!   to/from datagram bytes by the reference UDP decoder.
//! - **Errors** ([`ProtocolError`]).
//!
//! Parsing the OSC/TUIO binary format is out of scope; a real TUIO decoder
//! produces the same [`EntityMessage`] values and plugs in above this crate.
//!
//! ```text
//! Transport (datagrams) → Protocol (EntityFrame) → Adapters (points)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{EntityAction, EntityFrame, EntityKind, EntityMessage, RawEntity};
