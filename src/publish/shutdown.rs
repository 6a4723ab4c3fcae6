//! Shutdown signalling between the main thread and the listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::{ReportError, ReportResult};

/// Cancellation flag shared by the listener and whoever stops it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Block until SIGINT or SIGTERM arrives, then cancel `token`.
pub fn wait_for_termination(token: &ShutdownToken) -> ReportResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| ReportError::Io {
            context: "failed to start signal runtime".to_string(),
            source,
        })?;

    let signal = rt
        .block_on(termination_signal())
        .map_err(|source| ReportError::Io {
            context: "failed to listen for termination signals".to_string(),
            source,
        })?;
    info!(signal, "received shutdown signal");
    token.cancel();
    Ok(())
}

#[cfg(unix)]
async fn termination_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}
