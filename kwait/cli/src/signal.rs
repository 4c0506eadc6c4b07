use anyhow::Context as _;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancels `shutdown` on the first SIGINT or SIGTERM.
#[cfg(unix)]
pub fn cancel_on_signal(shutdown: CancellationToken) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        warn!(signal = name, "interrupted, stopping all waits");
        shutdown.cancel();
    });

    Ok(())
}

/// Cancels `shutdown` on the first Ctrl-C.
#[cfg(not(unix))]
pub fn cancel_on_signal(shutdown: CancellationToken) -> anyhow::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping all waits");
            shutdown.cancel();
        }
    });

    Ok(())
}
