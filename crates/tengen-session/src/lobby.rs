//! One full sitting: enter the lobby, play, leave the lobby.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tengen_service::GameService;

use crate::{CommandSource, EventLoop, ExitReason, Renderer, SessionController, SessionError};

/// Plays one sitting against `service`.
///
/// Entering the lobby must succeed before anything else happens. Once
/// inside, the lobby is always left on the way out, even when the loop
/// itself failed; a loop error takes precedence over a leave error.
pub async fn play<S, R, F, W>(
    service: Arc<S>,
    renderer: R,
    commands: &mut CommandSource,
    shutdown: F,
    out: &mut W,
) -> Result<ExitReason, SessionError>
where
    S: GameService,
    R: Renderer,
    F: Future<Output = ()>,
    W: Write,
{
    writeln!(out, "Try to enter the Lobby...")?;
    service.enter_lobby().await.map_err(SessionError::EnterLobby)?;
    tracing::info!("entered the lobby");

    // From here on every exit path goes through LeaveLobby.
    let outcome = match writeln!(out, "Welcome to a Go game") {
        Ok(()) => {
            let controller = SessionController::new(Arc::clone(&service));
            EventLoop::new(controller, renderer)
                .run(commands, shutdown, out)
                .await
        }
        Err(e) => Err(SessionError::Output(e)),
    };
    commands.stop();

    // The terminal may be gone; leaving still matters to the service.
    let _ = writeln!(out, "Leave the Lobby...");
    let left = service.leave_lobby().await;
    match &left {
        Ok(()) => tracing::info!("left the lobby"),
        Err(e) => tracing::warn!(error = %e, "leave lobby failed"),
    }

    let reason = outcome?;
    left.map_err(SessionError::LeaveLobby)?;
    Ok(reason)
}
