//! The event loop: one player, one sitting.
//!
//! Three sources feed the loop:
//!
//! ```text
//! CommandSource ──line──┐
//! PendingOperation ─────┼──→ select! ──→ SessionController ──→ Renderer ──→ out
//! shutdown future ──────┘
//! ```
//!
//! Exactly one event is handled per iteration, so the controller never sees
//! two things at once and needs no locking. After every event the loop
//! prints the controller's notices and then the current view.

use std::future::Future;
use std::io::Write;

use tengen_service::GameService;

use crate::controller::{Completion, Flow};
use crate::{CommandSource, Renderer, SessionController, SessionError};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The player typed `quit`.
    Quit,
    /// The shutdown future resolved (Ctrl-C, SIGTERM).
    Shutdown,
    /// The input stream ended.
    InputClosed,
}

enum Event {
    Line(Option<String>),
    Completion(Completion),
    Shutdown,
}

/// Couples a [`SessionController`] with a [`Renderer`].
pub struct EventLoop<S, R> {
    controller: SessionController<S>,
    renderer: R,
}

impl<S: GameService, R: Renderer> EventLoop<S, R> {
    pub fn new(controller: SessionController<S>, renderer: R) -> Self {
        Self {
            controller,
            renderer,
        }
    }

    pub fn controller(&self) -> &SessionController<S> {
        &self.controller
    }

    /// Runs until the player quits, the input ends, or `shutdown` resolves.
    ///
    /// Whatever the exit path (including an output error), the session is
    /// cleaned up before returning: the pending wait is cancelled and the
    /// game, if any, is left.
    pub async fn run<F, W>(
        &mut self,
        commands: &mut CommandSource,
        shutdown: F,
        out: &mut W,
    ) -> Result<ExitReason, SessionError>
    where
        F: Future<Output = ()>,
        W: Write,
    {
        let outcome = self.drive(commands, shutdown, out).await;

        // A no-op after Quit, which already cleaned up.
        self.controller.shutdown().await;
        let flushed = self.write_notices(out);

        let reason = outcome?;
        flushed?;
        tracing::info!(?reason, "session loop finished");
        Ok(reason)
    }

    async fn drive<F, W>(
        &mut self,
        commands: &mut CommandSource,
        shutdown: F,
        out: &mut W,
    ) -> Result<ExitReason, SessionError>
    where
        F: Future<Output = ()>,
        W: Write,
    {
        tokio::pin!(shutdown);
        self.show(out)?;

        loop {
            let event = tokio::select! {
                line = commands.next_line() => Event::Line(line),
                completion = self.controller.next_completion() => Event::Completion(completion),
                () = &mut shutdown => Event::Shutdown,
            };

            match event {
                Event::Line(Some(line)) => {
                    let command = self.controller.parse(&line);
                    tracing::debug!(%command, mode = %self.controller.mode(), "command");
                    if self.controller.handle_command(command).await == Flow::Quit {
                        return Ok(ExitReason::Quit);
                    }
                }
                Event::Line(None) => {
                    tracing::info!("input closed");
                    return Ok(ExitReason::InputClosed);
                }
                Event::Completion(completion) => {
                    self.controller.apply_completion(completion);
                }
                Event::Shutdown => {
                    tracing::info!("shutdown requested");
                    return Ok(ExitReason::Shutdown);
                }
            }

            self.show(out)?;
        }
    }

    fn show<W: Write>(&mut self, out: &mut W) -> Result<(), SessionError> {
        self.write_notices(out)?;
        let view = self
            .renderer
            .render(self.controller.mode(), self.controller.snapshot());
        out.write_all(view.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn write_notices<W: Write>(&mut self, out: &mut W) -> Result<(), SessionError> {
        for notice in self.controller.take_notices() {
            writeln!(out, "{notice}")?;
        }
        out.flush()?;
        Ok(())
    }
}
