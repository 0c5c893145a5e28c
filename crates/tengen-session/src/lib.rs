//! Interactive session control for Tengen.
//!
//! This crate drives one player's sitting against a [`GameService`]:
//!
//! 1. **State**: [`Session`] and its [`Mode`]
//! 2. **Transitions**: [`SessionController`], reacting to player
//!    [`Command`]s and to the result of the one [`PendingOperation`] that
//!    may be in flight
//! 3. **I/O**: [`CommandSource`] (blocking input on its own thread),
//!    [`Renderer`] (text out), and the [`EventLoop`] tying them together
//! 4. **The sitting**: [`play`] enters the lobby, loops, leaves the lobby
//!
//! # How it fits in the stack
//!
//! ```text
//! Binary (above)  ← config, connection, signals
//!     ↕
//! Session Layer (this crate)  ← modes, commands, waits, rendering
//!     ↕
//! Service Layer (below)  ← GameService calls
//! ```
//!
//! [`GameService`]: tengen_service::GameService

mod command;
mod controller;
mod error;
mod event_loop;
mod lobby;
mod pending;
mod render;
mod session;
mod source;

pub use command::Command;
pub use controller::{Completion, Flow, SessionController};
pub use error::SessionError;
pub use event_loop::{EventLoop, ExitReason};
pub use lobby::play;
pub use pending::{PendingOperation, WaitKind, WaitResult};
pub use render::{Renderer, TextRenderer};
pub use session::{Mode, Session};
pub use source::CommandSource;
