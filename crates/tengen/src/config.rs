//! Command line, environment and config-file settings.
//!
//! Every setting can come from four places. The first one that has it wins:
//!
//! 1. a command-line flag (`--login`),
//! 2. an environment variable (`TENGEN_LOGIN`),
//! 3. the TOML config file (`login = "..."`), by default `$HOME/.tengen.toml`,
//! 4. the built-in default (address `localhost`, port `7777`).
//!
//! Login and password have no default and must be given somewhere. Without
//! a certificate (`--cert`) the connection is plain `ws://`; with one it is
//! `wss://` and only that certificate is trusted.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tengen_service::Credentials;

use crate::TengenError;

pub const DEFAULT_ADDRESS: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7777;
const DEFAULT_CONFIG_FILE: &str = ".tengen.toml";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tengen",
    about = "Play Go against other players on a remote game service",
    version
)]
pub struct Cli {
    /// Config file (default is $HOME/.tengen.toml)
    #[arg(short = 'c', long, global = true, env = "TENGEN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Login to use
    #[arg(short = 'l', long, global = true, env = "TENGEN_LOGIN")]
    pub login: Option<String>,

    /// Password to use
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "TENGEN_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Address of the game service
    #[arg(short = 'A', long, global = true, env = "TENGEN_ADDRESS")]
    pub address: Option<String>,

    /// Port of the game service
    #[arg(short = 'P', long, global = true, env = "TENGEN_PORT")]
    pub port: Option<u16>,

    /// TLS certificate of the game service (PEM)
    #[arg(short = 'C', long, global = true, env = "TENGEN_CERT", value_name = "PATH")]
    pub cert: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enter the lobby and play (default when no subcommand is given)
    Play,
    /// Register the login on the game service
    Register,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Play)
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub login: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub cert: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, TengenError> {
        toml::from_str(text).map_err(|e| TengenError::Config(format!("{}: {e}", path.display())))
    }

    /// Reads `path`. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, TengenError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::parse(&text, path)?;
                tracing::info!(path = %path.display(), "using config file");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file");
                Ok(Self::default())
            }
            Err(e) => Err(TengenError::Config(format!(
                "can't read {}: {e}",
                path.display()
            ))),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub address: String,
    pub port: u16,
    pub credentials: Credentials,
    pub cert: Option<PathBuf>,
}

impl Settings {
    /// Loads the config file named by `cli` (or the default one) and merges
    /// it under the command line.
    pub fn load(cli: &Cli) -> Result<Self, TengenError> {
        let file = match (&cli.config, default_config_path()) {
            (Some(path), _) => FileConfig::load(path, true)?,
            (None, Some(path)) => FileConfig::load(&path, false)?,
            (None, None) => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, TengenError> {
        let login = cli.login.clone().or(file.login).filter(|s| !s.is_empty());
        let password = cli
            .password
            .clone()
            .or(file.password)
            .filter(|s| !s.is_empty());
        let (Some(login), Some(password)) = (login, password) else {
            return Err(TengenError::Config(
                "login and password should be specified".into(),
            ));
        };

        Ok(Self {
            address: cli
                .address
                .clone()
                .or(file.address)
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            credentials: Credentials::new(login, password),
            cert: cli.cert.clone().or(file.cert),
        })
    }
}
