//! Player commands parsed from input lines.

use std::fmt;

use crate::Mode;

/// One line of player input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `q` / `quit`: leave the lobby and end the sitting.
    Quit,
    /// `j` / `join`: look for a game on the standard board.
    JoinRequest,
    /// `e` / `exit`: leave the current game, stay in the lobby.
    Exit,
    /// `x y`: place a stone. Only recognised while it is the player's turn.
    Move { x: i64, y: i64 },
    /// Anything else, kept verbatim for the error message.
    Unrecognized(String),
}

impl Command {
    /// Interprets `line` for a session currently in `mode`.
    ///
    /// Coordinates are only parsed during [`Mode::PerformTurn`]; at any other
    /// time `3 4` is just an unknown command.
    pub fn parse(line: &str, mode: Mode) -> Self {
        let text = line.trim();
        match text {
            "q" | "quit" => Self::Quit,
            "j" | "join" => Self::JoinRequest,
            "e" | "exit" => Self::Exit,
            _ => match parse_move(text) {
                Some((x, y)) if mode == Mode::PerformTurn => Self::Move { x, y },
                _ => Self::Unrecognized(text.to_string()),
            },
        }
    }
}

/// Exactly two whitespace-separated integers.
fn parse_move(text: &str) -> Option<(i64, i64)> {
    let mut parts = text.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => f.write_str("quit"),
            Self::JoinRequest => f.write_str("join"),
            Self::Exit => f.write_str("exit"),
            Self::Move { x, y } => write!(f, "{x} {y}"),
            Self::Unrecognized(text) => f.write_str(text),
        }
    }
}
