//! Pending operations: long remote waits running in the background.
//!
//! `JoinGame` and `WaitTurn` can block on the service for minutes. Each one
//! runs in its own Tokio task so the event loop stays responsive to the
//! player. The task performs exactly one call and reports exactly one
//! result on a `oneshot` slot, unless it is cancelled first.
//!
//! # Cancellation
//!
//! Every operation owns a [`CancellationToken`]. Cancelling it makes the
//! task drop the in-flight call (which releases the request on the
//! service) and guarantees nothing is ever written to the slot afterwards.
//! Dropping a `PendingOperation` cancels it, so an operation can never be
//! discarded while its call keeps running.

use std::fmt;
use std::future::{Future, pending};

use tengen_service::{GameSnapshot, ServiceError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::Mode;

/// The single value a wait reports.
pub type WaitResult = Result<GameSnapshot, ServiceError>;

/// Which remote wait an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitKind {
    /// `JoinGame`: waiting for an opponent.
    Join,
    /// `WaitTurn`: waiting for the opponent to move.
    Turn,
}

impl WaitKind {
    /// The mode a session is in while this kind of wait is outstanding.
    pub fn mode(self) -> Mode {
        match self {
            Self::Join => Mode::WaitJoin,
            Self::Turn => Mode::WaitTurn,
        }
    }
}

impl fmt::Display for WaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join => f.write_str("join-game"),
            Self::Turn => f.write_str("wait-turn"),
        }
    }
}

/// One cancellable, single-result background call.
pub struct PendingOperation {
    kind: WaitKind,
    slot: oneshot::Receiver<WaitResult>,
    cancel: CancellationToken,
    /// Set once the slot has produced its value.
    done: bool,
}

impl PendingOperation {
    /// Spawns `call` on a background task and returns the handle to its
    /// result.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn launch<F>(kind: WaitKind, call: F) -> Self
    where
        F: Future<Output = WaitResult> + Send + 'static,
    {
        let (result_tx, slot) = oneshot::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!(%kind, "wait abandoned");
                }
                result = call => {
                    // The receiver is gone only if the operation was
                    // dropped between completion and this send.
                    let _ = result_tx.send(result);
                }
            }
        });

        tracing::debug!(%kind, "wait launched");
        Self {
            kind,
            slot,
            cancel,
            done: false,
        }
    }

    pub fn kind(&self) -> WaitKind {
        self.kind
    }

    /// Stops the background call. Safe to call any number of times, and a
    /// no-op once the result has arrived.
    pub fn cancel(&self) {
        if self.done || self.cancel.is_cancelled() {
            return;
        }
        tracing::debug!(kind = %self.kind, "cancelling wait");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the operation's one result.
    ///
    /// Never resolves for a cancelled operation, nor a second time after
    /// the result was delivered.
    pub async fn completion(&mut self) -> WaitResult {
        if self.done || self.cancel.is_cancelled() {
            return pending().await;
        }

        let result = (&mut self.slot).await;
        self.done = true;
        match result {
            Ok(result) => result,
            Err(_) => {
                // The task ended without reporting: it panicked or the
                // runtime is shutting down.
                tracing::warn!(kind = %self.kind, "wait task ended without a result");
                Err(ServiceError::Disconnected)
            }
        }
    }
}

impl Drop for PendingOperation {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("kind", &self.kind)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tengen_service::ColourState;

    use super::*;

    fn board(size: u32) -> GameSnapshot {
        GameSnapshot {
            size,
            komi: 0.5,
            black: ColourState::default(),
            white: ColourState::default(),
        }
    }

    #[tokio::test]
    async fn test_completion_delivers_the_call_result() {
        let mut op = PendingOperation::launch(WaitKind::Join, async { Ok(board(9)) });

        let result = op.completion().await;

        assert_eq!(result.unwrap(), board(9));
        assert_eq!(op.kind(), WaitKind::Join);
    }

    #[tokio::test]
    async fn test_completion_delivers_errors_too() {
        let mut op = PendingOperation::launch(WaitKind::Turn, async {
            Err(ServiceError::InvalidMove("occupied".into()))
        });

        assert!(op.completion().await.unwrap_err().is_invalid_move());
    }

    #[tokio::test]
    async fn test_cancelled_operation_never_completes() {
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let mut op = PendingOperation::launch(WaitKind::Turn, async move {
            let _ = release_rx.await;
            Ok(board(19))
        });

        op.cancel();
        let _ = release_tx.send(());

        let result = tokio::time::timeout(Duration::from_millis(50), op.completion()).await;
        assert!(result.is_err(), "a cancelled wait must stay silent");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_noop_after_completion() {
        let mut op = PendingOperation::launch(WaitKind::Join, async { Ok(board(9)) });
        assert!(op.completion().await.is_ok());

        op.cancel();
        op.cancel();
        assert!(!op.is_cancelled(), "cancel after completion does nothing");

        let again = tokio::time::timeout(Duration::from_millis(20), op.completion()).await;
        assert!(again.is_err(), "the result is delivered only once");
    }

    #[tokio::test]
    async fn test_cancel_twice_before_completion() {
        let op = PendingOperation::launch(WaitKind::Join, pending());
        op.cancel();
        op.cancel();
        assert!(op.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels_the_background_call() {
        // The sender lives inside the call; it is dropped when the task
        // drops the call future.
        let (alive_tx, alive_rx) = oneshot::channel::<()>();
        let op = PendingOperation::launch(WaitKind::Turn, async move {
            let _alive = alive_tx;
            pending::<()>().await;
            Ok(board(9))
        });

        drop(op);

        let closed = tokio::time::timeout(Duration::from_secs(1), alive_rx).await;
        assert!(
            matches!(closed, Ok(Err(_))),
            "the in-flight call should be dropped"
        );
    }
}
