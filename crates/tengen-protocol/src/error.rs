//! Error types for the protocol layer.
//!
//! Each crate in Tengen defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning envelopes into bytes or back,
//! not in the network or in the game.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// service speaking a newer protocol version.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but breaks protocol rules, e.g. the
    /// service answered a handshake with a game snapshot.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
