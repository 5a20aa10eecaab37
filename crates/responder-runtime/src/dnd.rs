//! Shared DND status cell.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use responder_models::DndStatus;

/// Single-writer DND status shared by the inbound webhook and the watcher.
///
/// Backed by a `watch` channel: the webhook handler writes, the watcher and
/// status endpoint read the latest value. Clones share the same cell.
#[derive(Clone)]
pub struct DndSwitch {
    tx: Arc<watch::Sender<DndStatus>>,
}

impl DndSwitch {
    /// Creates a switch in the given state.
    pub fn new(enabled: bool) -> Self {
        let (tx, _rx) = watch::channel(DndStatus {
            enabled,
            updated_at: None,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Sets DND on or off. Idempotent.
    pub fn set(&self, enabled: bool) -> DndStatus {
        let status = DndStatus::now(enabled);
        let previous = self.tx.send_replace(status);
        info!(
            enabled,
            changed = previous.enabled != enabled,
            "DND status {}",
            if enabled { "enabled" } else { "disabled" }
        );
        status
    }

    /// Latest status.
    pub fn status(&self) -> DndStatus {
        *self.tx.borrow()
    }

    /// Whether DND is currently on.
    pub fn is_enabled(&self) -> bool {
        self.tx.borrow().enabled
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<DndStatus> {
        self.tx.subscribe()
    }
}

impl Default for DndSwitch {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_off_without_timestamp() {
        let switch = DndSwitch::default();
        assert!(!switch.is_enabled());
        assert!(switch.status().updated_at.is_none());
    }

    #[test]
    fn test_set_is_idempotent_and_shared() {
        let switch = DndSwitch::new(false);
        let reader = switch.clone();

        switch.set(true);
        switch.set(true);
        assert!(reader.is_enabled());
        assert!(reader.status().updated_at.is_some());

        switch.set(false);
        assert!(!reader.is_enabled());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let switch = DndSwitch::new(false);
        let mut rx = switch.subscribe();

        switch.set(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().enabled);
    }
}
