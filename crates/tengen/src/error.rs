//! Unified error type for the Tengen client.

use tengen_protocol::ProtocolError;
use tengen_service::ServiceError;
use tengen_session::SessionError;
use tengen_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TengenError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-service call failed outside of play (connect, register).
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The sitting ended with an error (lobby, terminal).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Bad or incomplete settings.
    #[error("configuration: {0}")]
    Config(String),

    /// The player declined a confirmation prompt.
    #[error("canceled")]
    Canceled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
