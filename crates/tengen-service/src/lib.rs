//! Game-service client for Tengen.
//!
//! This crate is the typed boundary between the session controller and the
//! remote Go game service:
//!
//! 1. **The contract**: the [`GameService`] trait: six game operations
//!    plus registration, each an async call that can be cancelled by
//!    dropping it.
//! 2. **The implementation**: [`RemoteGameService`]: handshake, then an
//!    RPC actor multiplexing requests over one connection.
//! 3. **Errors**: [`ServiceError`], with the one classification the
//!    game cares about: [`ServiceError::InvalidMove`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← drives the game through GameService
//!     ↕
//! Service Layer (this crate)  ← requests, replies, cancellation
//!     ↕
//! Protocol + Transport (below)  ← envelopes and bytes
//! ```

mod error;
mod remote;
mod rpc;
mod service;

pub use error::ServiceError;
pub use remote::RemoteGameService;
pub use service::{Credentials, GameService};

pub use tengen_protocol::{ColourState, GameSnapshot, Point, Stone};
