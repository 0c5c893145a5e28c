//! Wire protocol for Tengen.
//!
//! This crate defines the "language" the client and the Go game service
//! speak:
//!
//! - **Types** ([`Envelope`], [`Request`], [`Reply`], [`GameSnapshot`]):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Service (GameService calls)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Body, ColourState, Envelope, ErrorCode, GameSnapshot, PROTOCOL_VERSION, Point, Reply,
    Request, Stone,
};
