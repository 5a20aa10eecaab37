//! Background task management for the watcher.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};
use crate::watcher::Watcher;

/// Runs a [`Watcher`] on a background task with cooperative shutdown.
pub struct Runtime {
    /// The watcher, held here while not running.
    watcher: Option<Watcher>,
    /// Handle to the watcher task; yields the watcher back on exit.
    watcher_handle: Option<JoinHandle<Watcher>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Whether the runtime has been started.
    started: bool,
}

impl Runtime {
    /// Create a new runtime around `watcher`.
    pub fn new(watcher: Watcher) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        Self {
            watcher: Some(watcher),
            watcher_handle: None,
            shutdown_tx,
            started: false,
        }
    }

    /// Start the runtime (begins polling).
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RuntimeError::AlreadyStarted);
        }
        let mut watcher = self.watcher.take().ok_or(RuntimeError::AlreadyStarted)?;

        info!("starting runtime");

        self.shutdown_tx.send_replace(false);
        let shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            watcher.run(shutdown_rx).await;
            watcher
        });

        self.watcher_handle = Some(handle);
        self.started = true;

        debug!("runtime started");

        Ok(())
    }

    /// Stop the runtime gracefully, waiting for the in-flight poll to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(RuntimeError::NotStarted);
        }

        info!("shutting down runtime");

        self.shutdown_tx.send(true).map_err(|e| {
            RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        if let Some(handle) = self.watcher_handle.take() {
            debug!("waiting for watcher to stop");
            let watcher = handle.await.map_err(|e| {
                RuntimeError::Shutdown(format!("watcher task panicked: {}", e))
            })?;
            self.watcher = Some(watcher);
        }

        self.started = false;

        info!("runtime stopped");

        Ok(())
    }

    /// Check if the runtime has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The watcher, while the runtime is stopped.
    pub fn watcher(&self) -> Option<&Watcher> {
        self.watcher.as_ref()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.started {
            let _ = self.shutdown_tx.send(true);
        }
    }
}
