use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tengen::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout belongs to the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tengen failed");
            eprintln!("tengen: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), TengenError> {
    let settings = Settings::load(cli)?;
    let mut out = io::stdout();

    match cli.command() {
        Command::Play => {
            writeln!(out, "Hello: {}", settings.credentials.login)?;
            let client = TengenClient::builder().settings(&settings).connect().await?;
            let mut commands = CommandSource::stdin()?;

            let reason = client
                .play(&mut commands, shutdown_signal(), &mut out)
                .await?;
            if reason == ExitReason::Shutdown {
                writeln!(out)?;
            }
        }
        Command::Register => {
            confirm_registration(&settings.credentials.login, &mut io::stdin().lock(), &mut out)?;
            let client = TengenClient::builder().settings(&settings).connect().await?;
            client.register().await?;
            writeln!(out, "Done")?;
        }
    }
    Ok(())
}
