//! # Tengen
//!
//! Terminal client for a remote turn-based Go game service.
//!
//! Tengen connects to the service, enters the lobby and lets one player
//! join a game, wait for the opponent and place stones, all from a
//! line-oriented terminal interface.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tengen::prelude::*;
//!
//! # async fn run() -> Result<(), TengenError> {
//! let client = TengenClient::builder()
//!     .address("localhost")
//!     .port(7777)
//!     .credentials(Credentials::new("alice", "secret"))
//!     .connect()
//!     .await?;
//!
//! let mut commands = CommandSource::stdin()?;
//! client
//!     .play(&mut commands, shutdown_signal(), &mut std::io::stdout())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
mod signal;

pub use client::{TengenClient, TengenClientBuilder, confirm_registration};
pub use error::TengenError;
pub use signal::shutdown_signal;

pub mod prelude {
    pub use crate::client::{TengenClient, TengenClientBuilder, confirm_registration};
    pub use crate::config::{Cli, Command, Settings};
    pub use crate::error::TengenError;
    pub use crate::signal::shutdown_signal;

    pub use tengen_service::{Credentials, GameService, GameSnapshot, RemoteGameService};
    pub use tengen_session::{CommandSource, ExitReason, Mode, Renderer, TextRenderer};
}
