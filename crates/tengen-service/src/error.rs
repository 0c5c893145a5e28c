//! Error types for remote game-service calls.

use tengen_protocol::{ErrorCode, ProtocolError};
use tengen_transport::TransportError;

/// Errors a [`GameService`](crate::GameService) call can fail with.
///
/// The session controller branches on exactly one classification:
/// [`ServiceError::InvalidMove`]. Everything else ends the wait or the
/// turn and is shown to the player as-is.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service rejected a turn because the coordinate is illegal on
    /// the current board (occupied, out of range, suicide, ...). The
    /// previous snapshot is still valid and the player may try again.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The service answered with an error status.
    #[error("{code}: {message}")]
    Rejected { code: ErrorCode, message: String },

    /// The connection went away while the call was in flight.
    #[error("connection to the game service was lost")]
    Disconnected,

    /// The service answered with a reply that doesn't fit the request
    /// (e.g. a snapshot for `LeaveGame`).
    #[error("unexpected reply to {request}")]
    UnexpectedReply { request: &'static str },

    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ServiceError {
    /// Returns `true` for a rejected turn the player can retry.
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, Self::InvalidMove(_))
    }
}
