//! `TengenClient` builder and the two things a client can do: play a
//! sitting or register the login.
//!
//! This is the entry point of the binary. It ties together all the layers:
//! transport → protocol → service → session.

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tengen_service::{Credentials, GameService, RemoteGameService};
use tengen_session::{CommandSource, ExitReason, TextRenderer};
use tengen_transport::TlsRoots;

use crate::TengenError;
use crate::config::{DEFAULT_ADDRESS, DEFAULT_PORT, Settings};

/// Builder for connecting a [`TengenClient`].
///
/// # Example
///
/// ```rust,ignore
/// use tengen::prelude::*;
///
/// let client = TengenClient::builder()
///     .address("go.example")
///     .port(7777)
///     .credentials(Credentials::new("alice", "secret"))
///     .cert("server.crt")
///     .connect()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct TengenClientBuilder {
    address: String,
    port: u16,
    credentials: Option<Credentials>,
    cert: Option<PathBuf>,
}

impl TengenClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            credentials: None,
            cert: None,
        }
    }

    /// Takes everything from resolved settings.
    pub fn settings(self, settings: &Settings) -> Self {
        let builder = self
            .address(&settings.address)
            .port(settings.port)
            .credentials(settings.credentials.clone());
        match &settings.cert {
            Some(cert) => builder.cert(cert),
            None => builder,
        }
    }

    /// Sets the game service's host name or IP address.
    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Switches to `wss://`, trusting only the PEM certificate at `path`.
    pub fn cert(mut self, path: impl AsRef<Path>) -> Self {
        self.cert = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn url(&self) -> String {
        let scheme = if self.cert.is_some() { "wss" } else { "ws" };
        format!("{scheme}://{}:{}", self.address, self.port)
    }

    /// Connects and authenticates.
    ///
    /// Uses `WebSocketConnection` and `JsonCodec`. An unreadable
    /// certificate fails before anything is sent.
    pub async fn connect(self) -> Result<TengenClient, TengenError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| TengenError::Config("login and password should be specified".into()))?;
        let url = self.url();

        tracing::info!(%url, login = %credentials.login, "connecting");
        let service = match &self.cert {
            Some(path) => {
                let roots = TlsRoots::from_pem_file(path)?;
                RemoteGameService::connect_tls(&url, &roots, credentials).await?
            }
            None => RemoteGameService::connect(&url, credentials).await?,
        };

        Ok(TengenClient {
            service: Arc::new(service),
        })
    }
}

impl Default for TengenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connected, authenticated client.
pub struct TengenClient {
    service: Arc<RemoteGameService>,
}

impl TengenClient {
    /// Creates a new builder.
    pub fn builder() -> TengenClientBuilder {
        TengenClientBuilder::new()
    }

    /// Plays one sitting with the text renderer until the player quits, the
    /// input ends, or `shutdown` resolves.
    pub async fn play<F, W>(
        &self,
        commands: &mut CommandSource,
        shutdown: F,
        out: &mut W,
    ) -> Result<ExitReason, TengenError>
    where
        F: Future<Output = ()>,
        W: Write,
    {
        let reason = tengen_session::play(
            Arc::clone(&self.service),
            TextRenderer,
            commands,
            shutdown,
            out,
        )
        .await?;
        Ok(reason)
    }

    /// Registers the login on the service.
    pub async fn register(&self) -> Result<(), TengenError> {
        self.service.register_user().await?;
        tracing::info!("user registered");
        Ok(())
    }
}

/// Asks the player to confirm registering `login`. Only the exact answer
/// `yes` confirms; anything else (or no answer) is [`TengenError::Canceled`].
pub fn confirm_registration<R, W>(login: &str, input: &mut R, out: &mut W) -> Result<(), TengenError>
where
    R: BufRead,
    W: Write,
{
    writeln!(
        out,
        "do you really want to register {login:?} user on service?\ntype \"yes\" if you do."
    )?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim_end_matches(['\r', '\n']) == "yes" {
        Ok(())
    } else {
        Err(TengenError::Canceled)
    }
}
