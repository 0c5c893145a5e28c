//! Error types for the session layer.

use tengen_service::ServiceError;

/// Errors that end a sitting.
///
/// Failures of individual game calls never show up here: the controller
/// turns them into mode changes and notices. Only the lobby boundary and
/// the terminal itself can fail a whole sitting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The service refused to let the player into the lobby.
    #[error("can't enter the lobby: {0}")]
    EnterLobby(#[source] ServiceError),

    /// Leaving the lobby failed after the sitting had ended.
    #[error("can't leave the lobby: {0}")]
    LeaveLobby(#[source] ServiceError),

    /// Writing to the player's terminal failed.
    #[error("output failed: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_lobby_errors_keep_the_service_cause() {
        let err = SessionError::EnterLobby(ServiceError::Disconnected);
        assert!(err.to_string().starts_with("can't enter the lobby"));
        assert!(err.source().is_some());
    }
}
