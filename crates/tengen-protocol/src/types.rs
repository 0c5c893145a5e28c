//! Core protocol types for Tengen's wire format.
//!
//! This module defines every type that travels "on the wire" between the
//! client and the Go game service: the request/reply envelopes and the
//! [`GameSnapshot`] the service sends back after every wait or turn.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The current protocol version. The client sends this in its handshake
/// and the service rejects incompatible clients.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Board types
// ---------------------------------------------------------------------------

/// An intersection on the board.
///
/// Coordinates are 1-based, matching what the player types: `1 1` is the
/// top-left corner. They are signed: the service owns validation, so
/// the client forwards whatever the player typed and lets the service reply
/// with an invalid-move error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The colour of a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Stone {
    Black,
    White,
}

/// One player's situation in a game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColourState {
    /// Stones this colour has placed on the board.
    #[serde(default)]
    pub stones_on_board: Vec<Point>,
    /// Stones still available to place.
    pub stones_in_cup: u32,
    /// Opponent stones this colour has captured.
    pub stones_captured: u32,
    /// Current score (fractional because of komi).
    pub score: f64,
}

/// An immutable point-in-time view of a game, as reported by the service.
///
/// The client never edits a snapshot: each successful wait or turn
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Width and height of the (square) board.
    pub size: u32,
    /// Compensation points awarded to white.
    pub komi: f64,
    pub black: ColourState,
    pub white: ColourState,
}

impl GameSnapshot {
    /// Returns which stone, if any, occupies the intersection `(x, y)`.
    pub fn stone_at(&self, x: i64, y: i64) -> Option<Stone> {
        let point = Point { x, y };
        if self.black.stones_on_board.contains(&point) {
            Some(Stone::Black)
        } else if self.white.stones_on_board.contains(&point) {
            Some(Stone::White)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Classification of a failed request.
///
/// These mirror the usual RPC status codes. The client only branches on a
/// few of them (`InvalidArgument` for an illegal move, `Unauthenticated`
/// during the handshake); the rest are reported to the player verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ErrorCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    FailedPrecondition,
    Unauthenticated,
    Unavailable,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cancelled => "Canceled",
            Self::Unknown => "Unknown",
            Self::InvalidArgument => "InvalidArgument",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::PermissionDenied => "PermissionDenied",
            Self::FailedPrecondition => "FailedPrecondition",
            Self::Unauthenticated => "Unauthenticated",
            Self::Unavailable => "Unavailable",
            Self::Internal => "Internal",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Requests and replies
// ---------------------------------------------------------------------------

/// Client → Service: one remote operation.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "MakeTurn", "x": 3, "y": 4 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// First message on every connection. Carries the credentials the
    /// service authenticates every later request against.
    Handshake {
        version: u32,
        login: String,
        password: String,
    },

    /// Create the player's account on the service.
    RegisterUser,

    EnterLobby,
    LeaveLobby,

    /// Blocks on the service side until an opponent is found.
    JoinGame,

    /// Blocks on the service side until it is this player's turn.
    WaitTurn,

    /// Place a stone at `(x, y)`.
    MakeTurn { x: i64, y: i64 },

    LeaveGame,

    /// Abandon the in-flight request with the given envelope id.
    /// The service sends no reply to a cancel.
    Cancel { id: u64 },
}

impl Request {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "Handshake",
            Self::RegisterUser => "RegisterUser",
            Self::EnterLobby => "EnterLobby",
            Self::LeaveLobby => "LeaveLobby",
            Self::JoinGame => "JoinGame",
            Self::WaitTurn => "WaitTurn",
            Self::MakeTurn { .. } => "MakeTurn",
            Self::LeaveGame => "LeaveGame",
            Self::Cancel { .. } => "Cancel",
        }
    }
}

/// Service → Client: the outcome of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Reply {
    /// The request succeeded and carries no data.
    Ack,

    /// The request succeeded and produced a new game snapshot.
    State { snapshot: GameSnapshot },

    /// The request failed.
    Error { code: ErrorCode, message: String },
}

/// The content of an envelope: a request or the reply to one.
///
/// Adjacently tagged:
///   `{ "type": "Request", "data": { "type": "JoinGame" } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Body {
    Request(Request),
    Reply(Reply),
}

/// The top-level message wrapper. Every message on the wire is an Envelope.
///
/// ```text
/// ┌─────────────────────────────────┐
/// │ id: 42                          │  ← correlates reply with request
/// │ ┌─────────────────────────────┐ │
/// │ │ body: Request(MakeTurn{..}) │ │  ← the actual content
/// │ └─────────────────────────────┘ │
/// └─────────────────────────────────┘
/// ```
///
/// A reply reuses the id of the request it answers. Several requests may
/// be in flight on one connection (a long `WaitTurn` next to a
/// `LeaveGame`), so replies can arrive in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: u64,
    pub body: Body,
}

impl Envelope {
    /// Wraps a request.
    pub fn request(id: u64, request: Request) -> Self {
        Self {
            id,
            body: Body::Request(request),
        }
    }

    /// Wraps a reply.
    pub fn reply(id: u64, reply: Reply) -> Self {
        Self {
            id,
            body: Body::Reply(reply),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
