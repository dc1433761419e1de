use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::Settings,
    interactive::{InteractiveLoop, LoopExit},
    notifier::Notifier,
    periodic::PeriodicLoop,
};

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The user typed `exit`.
    ExitRequested,
    /// The token was cancelled from outside, e.g. by Ctrl-C.
    Cancelled,
}

/// Run the periodic and interactive loops together until one asks to stop.
///
/// When either loop ends, `token` is cancelled and the other one is awaited
/// before this returns. A panic in either loop is returned as an error.
pub async fn run(
    settings: Arc<Settings>,
    notifier: Arc<Notifier>,
    token: CancellationToken,
) -> Result<Shutdown> {
    let periodic = PeriodicLoop::new(
        Arc::clone(&notifier),
        settings.default_coordinate(),
        settings.check_interval(),
        token.clone(),
    );
    let interactive = InteractiveLoop::new(notifier, token.clone());

    let mut periodic = tokio::spawn(periodic.run());
    let mut interactive = tokio::spawn(interactive.run());

    // Whichever loop ends first, for any reason, takes the other one down.
    let exit = tokio::select! {
        exit = &mut interactive => {
            token.cancel();
            let stopped = periodic.await;
            let exit = exit.context("interactive loop failed")?;
            stopped.context("periodic loop failed")?;
            exit
        }
        stopped = &mut periodic => {
            token.cancel();
            let exit = interactive.await;
            stopped.context("periodic loop failed")?;
            exit.context("interactive loop failed")?
        }
    };

    let shutdown = match exit {
        LoopExit::Terminate => Shutdown::ExitRequested,
        LoopExit::Cancelled => Shutdown::Cancelled,
    };
    info!(?shutdown, "all loops stopped");
    Ok(shutdown)
}
