//! The `GameService` trait: everything the client can ask the game
//! service to do.
//!
//! The session controller is written against this trait only. The
//! production implementation is [`RemoteGameService`](crate::RemoteGameService);
//! tests plug in scripted implementations.

use std::fmt;
use std::future::Future;

use tengen_protocol::GameSnapshot;

use crate::ServiceError;

/// A remote Go game service, as seen by one logged-in player.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one service handle is shared (behind an
///   `Arc`) between the event loop and the background wait tasks.
/// - Every method returns a `Send` future so calls can run inside
///   `tokio::spawn`. Implementors can simply write `async fn`.
///
/// # Cancellation
///
/// Every call is cancellable by dropping its future. Implementations must
/// release the remote side of a dropped call (the RPC client sends a
/// `Cancel` request for it).
pub trait GameService: Send + Sync + 'static {
    /// Creates the player's account.
    fn register_user(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Enters the lobby. Must succeed before any game call.
    fn enter_lobby(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Leaves the lobby. Called once at the end of every sitting.
    fn leave_lobby(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Waits until the service pairs this player with an opponent.
    fn join_game(&self) -> impl Future<Output = Result<GameSnapshot, ServiceError>> + Send;

    /// Waits until it is this player's turn (or the game ends, which the
    /// service reports as an error).
    fn wait_turn(&self) -> impl Future<Output = Result<GameSnapshot, ServiceError>> + Send;

    /// Places a stone at `(x, y)`.
    ///
    /// # Errors
    /// [`ServiceError::InvalidMove`] when the coordinate is illegal on the
    /// current board.
    fn make_turn(
        &self,
        x: i64,
        y: i64,
    ) -> impl Future<Output = Result<GameSnapshot, ServiceError>> + Send;

    /// Leaves the current game.
    fn leave_game(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Login and password sent in the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

/// Never print the password, even in debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter2");
        let text = format!("{creds:?}");
        assert!(text.contains("alice"));
        assert!(!text.contains("hunter2"));
    }
}
