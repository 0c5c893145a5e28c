//! Session types: the data that describes where a sitting is.
//!
//! A "session" is the client's record of one player's progress through the
//! lobby and a game. It tracks:
//! - WHAT phase the player is in ([`Mode`])
//! - the last board the service reported ([`GameSnapshot`])
//! - the one remote wait that may be in flight ([`PendingOperation`])

use std::fmt;

use tengen_service::GameSnapshot;

use crate::PendingOperation;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The session's current phase of game progress.
///
/// ```text
///   NoGame ──(join)──→ WaitJoin ──(joined)──→ WaitTurn ──(your turn)──→ PerformTurn
///     ↑                  │                      ↑  │                        │
///     └───(join failed)──┘                      │  └─(wait failed)→ GameOver│
///     ↑                                         └──────(turn made)──────────┘
///     └──────────────(exit: WaitTurn / PerformTurn / GameOver)
/// ```
///
/// The two waiting modes are exactly the ones backed by a
/// [`PendingOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// In the lobby, not in a game.
    #[default]
    NoGame,
    /// Waiting for the service to find an opponent.
    WaitJoin,
    /// In a game, waiting for the opponent's turn.
    WaitTurn,
    /// In a game, the player must move.
    PerformTurn,
    /// The game ended (or the service stopped answering); only leaving is
    /// possible.
    GameOver,
}

impl Mode {
    /// Returns `true` when the service considers the player part of a game,
    /// so leaving requires a `LeaveGame` call.
    pub fn is_in_game(self) -> bool {
        matches!(self, Self::WaitTurn | Self::PerformTurn | Self::GameOver)
    }

    /// Returns `true` for the modes that hold a pending remote wait.
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::WaitJoin | Self::WaitTurn)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoGame => "no-game",
            Self::WaitJoin => "wait-join",
            Self::WaitTurn => "wait-turn",
            Self::PerformTurn => "perform-turn",
            Self::GameOver => "game-over",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The whole mutable state of one sitting.
///
/// Owned by the [`SessionController`](crate::SessionController) and only
/// touched from the event loop, so it needs no locking.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) mode: Mode,
    pub(crate) snapshot: Option<GameSnapshot>,
    pub(crate) pending: Option<PendingOperation>,
}

impl Session {
    /// A fresh session: lobby, no board, nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// A wait is outstanding exactly when the mode is a waiting mode.
    pub fn is_consistent(&self) -> bool {
        self.pending.is_some() == self.mode.is_waiting()
    }
}
