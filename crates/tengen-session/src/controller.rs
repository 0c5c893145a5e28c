//! The session controller: the state machine behind one sitting.
//!
//! The controller owns the [`Session`] and is the only code that changes
//! it. It reacts to two kinds of events, both delivered by the event loop
//! one at a time:
//!
//! - **commands** typed by the player ([`handle_command`](SessionController::handle_command)),
//! - **completions** of the pending remote wait
//!   ([`next_completion`](SessionController::next_completion) /
//!   [`apply_completion`](SessionController::apply_completion)).
//!
//! Short calls (`MakeTurn`, `LeaveGame`) are awaited inline. Long waits
//! (`JoinGame`, `WaitTurn`) run as a [`PendingOperation`] so the player can
//! still quit while they block.
//!
//! Anything the player should read (errors, confirmations) is queued as a
//! notice and printed by the loop before the next prompt.

use std::future::pending;
use std::sync::Arc;

use tengen_service::{GameService, GameSnapshot};

use crate::{Command, Mode, PendingOperation, Session, WaitKind, WaitResult};

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The result of the session's pending wait, tagged with the operation it
/// came from.
#[derive(Debug)]
pub struct Completion {
    serial: u64,
    kind: WaitKind,
    result: WaitResult,
}

/// Drives one player's sitting against a [`GameService`].
pub struct SessionController<S> {
    service: Arc<S>,
    session: Session,
    /// Serial of the operation in `session.pending`; bumped on every launch
    /// so a completion from a superseded operation is recognisable.
    serial: u64,
    notices: Vec<String>,
}

impl<S: GameService> SessionController<S> {
    /// A controller for a player who has just entered the lobby.
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            session: Session::new(),
            serial: 0,
            notices: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.session.snapshot.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.session.pending.is_some()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parses an input line in the context of the current mode.
    pub fn parse(&self, line: &str) -> Command {
        Command::parse(line, self.session.mode)
    }

    /// Drains the messages queued for the player.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    /// Applies one player command.
    ///
    /// Returns [`Flow::Quit`] when the sitting should end; by then any
    /// pending wait is cancelled and the game (if any) has been left.
    pub async fn handle_command(&mut self, command: Command) -> Flow {
        let mode = self.session.mode;
        match (mode, command) {
            (_, Command::Quit) => {
                self.shutdown().await;
                return Flow::Quit;
            }
            (Mode::NoGame, Command::JoinRequest) => {
                self.launch(WaitKind::Join);
            }
            (Mode::WaitTurn | Mode::PerformTurn | Mode::GameOver, Command::Exit) => {
                self.exit_game().await;
            }
            (Mode::PerformTurn, Command::Move { x, y }) => {
                self.make_turn(x, y).await;
            }
            (mode, command) => {
                tracing::debug!(%mode, %command, "command unsupported in mode");
                self.notice(format!("no command \"{command}\" in current mode"));
            }
        }

        debug_assert!(self.session.is_consistent());
        Flow::Continue
    }

    /// Ends the sitting: cancels the pending wait and, when the service
    /// still counts the player as part of a game, leaves it.
    ///
    /// Idempotent: a second call finds nothing to cancel and no game.
    pub async fn shutdown(&mut self) {
        self.cancel_pending();
        if self.session.mode.is_in_game() {
            self.leave_game().await;
        }
        self.session.snapshot = None;
        self.set_mode(Mode::NoGame);
    }

    async fn exit_game(&mut self) {
        self.cancel_pending();
        self.leave_game().await;
        self.session.snapshot = None;
        self.set_mode(Mode::NoGame);
    }

    async fn leave_game(&mut self) {
        match self.service.leave_game().await {
            Ok(()) => {
                tracing::info!("left the game");
                self.notice("Left the game.");
            }
            Err(e) => {
                // The wait is already gone; stay consistent locally and let
                // the player know the service may still count them in.
                tracing::warn!(error = %e, "leave game failed");
                self.notice(format!("Error while leaving a game: {e}"));
            }
        }
    }

    async fn make_turn(&mut self, x: i64, y: i64) {
        match self.service.make_turn(x, y).await {
            Ok(snapshot) => {
                tracing::info!(x, y, "turn made");
                self.session.snapshot = Some(snapshot);
                self.launch(WaitKind::Turn);
            }
            Err(e) if e.is_invalid_move() => {
                tracing::debug!(x, y, error = %e, "move rejected");
                self.notice(e.to_string());
            }
            Err(e) => {
                tracing::warn!(x, y, error = %e, "turn failed");
                self.session.snapshot = None;
                self.notice(format!("Error while making a turn: {e}"));
                self.set_mode(Mode::GameOver);
            }
        }
    }

    // -----------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------

    /// Waits for the pending operation's result. Pends forever when
    /// nothing is in flight, which makes it safe to use as a `select!`
    /// branch.
    pub async fn next_completion(&mut self) -> Completion {
        let serial = self.serial;
        match self.session.pending.as_mut() {
            Some(op) => {
                let kind = op.kind();
                let result = op.completion().await;
                Completion {
                    serial,
                    kind,
                    result,
                }
            }
            None => pending().await,
        }
    }

    /// Applies a completion obtained from [`next_completion`](Self::next_completion).
    ///
    /// A completion whose operation is no longer the session's pending one
    /// (it was cancelled or superseded in between) is discarded.
    pub fn apply_completion(&mut self, completion: Completion) {
        let current = self.session.pending.as_ref().map(PendingOperation::kind);
        if completion.serial != self.serial
            || current != Some(completion.kind)
            || self.session.mode != completion.kind.mode()
        {
            tracing::debug!(
                kind = %completion.kind,
                mode = %self.session.mode,
                "discarding stale completion"
            );
            return;
        }
        // Consumed: nothing left to cancel.
        self.session.pending = None;

        match (completion.kind, completion.result) {
            (WaitKind::Join, Ok(snapshot)) => {
                tracing::info!("joined a game");
                self.session.snapshot = Some(snapshot);
                self.launch(WaitKind::Turn);
            }
            (WaitKind::Join, Err(e)) => {
                tracing::warn!(error = %e, "join failed");
                self.session.snapshot = None;
                self.notice(format!("Can't join a game: {e}"));
                self.set_mode(Mode::NoGame);
            }
            (WaitKind::Turn, Ok(snapshot)) => {
                self.session.snapshot = Some(snapshot);
                self.set_mode(Mode::PerformTurn);
            }
            (WaitKind::Turn, Err(e)) => {
                tracing::info!(error = %e, "wait for turn ended");
                self.session.snapshot = None;
                self.notice(format!("Can't wait a turn: {e}"));
                self.set_mode(Mode::GameOver);
            }
        }

        debug_assert!(self.session.is_consistent());
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    fn launch(&mut self, kind: WaitKind) {
        debug_assert!(self.session.pending.is_none(), "one wait at a time");

        let service = Arc::clone(&self.service);
        let op = match kind {
            WaitKind::Join => PendingOperation::launch(kind, async move { service.join_game().await }),
            WaitKind::Turn => PendingOperation::launch(kind, async move { service.wait_turn().await }),
        };
        self.serial += 1;
        self.session.pending = Some(op);
        self.set_mode(kind.mode());
    }

    fn cancel_pending(&mut self) {
        if let Some(op) = self.session.pending.take() {
            op.cancel();
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.session.mode != mode {
            tracing::info!(from = %self.session.mode, to = %mode, "mode changed");
            self.session.mode = mode;
        }
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.notices.push(text.into());
    }
}
