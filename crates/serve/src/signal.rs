// SPDX-License-Identifier: MIT

//! Interrupt/terminate handling for the background server process.
//!
//! A first signal wins and resolves the returned future; the caller races
//! it against the serve future and, on a signal win, shuts down gracefully.
//! Exit code follows the 128+signo convention.

use tokio::signal::unix::{signal, SignalKind};

pub const EXIT_SIGINT: i32 = 130;
pub const EXIT_SIGTERM: i32 = 143;

/// Waits for SIGINT or SIGTERM, returning the 128+signo exit code for
/// whichever arrives first. If a handler can't be registered, that signal
/// is simply never observed rather than treated as an immediate exit.
pub async fn wait_for_signal() -> i32 {
    let sigint = signal(SignalKind::interrupt());
    let sigterm = signal(SignalKind::terminate());

    match (sigint, sigterm) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => EXIT_SIGINT,
                _ = sigterm.recv() => EXIT_SIGTERM,
            }
        }
        (Ok(mut sigint), Err(err)) => {
            tracing::warn!(%err, "failed to register SIGTERM handler");
            sigint.recv().await;
            EXIT_SIGINT
        }
        (Err(err), Ok(mut sigterm)) => {
            tracing::warn!(%err, "failed to register SIGINT handler");
            sigterm.recv().await;
            EXIT_SIGTERM
        }
        (Err(err), Err(_)) => {
            tracing::warn!(%err, "failed to register signal handlers; graceful shutdown relies on the HTTP endpoint only");
            std::future::pending::<i32>().await
        }
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
