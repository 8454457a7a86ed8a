//! Session status broadcast
//!
//! The UI collaborator subscribes to a `watch` channel instead of polling the
//! store.

use std::sync::Arc;

use storefront_domain::SessionStatus;
use tokio::sync::watch;
use tracing::info;

/// Cloneable handle publishing [`SessionStatus`] transitions.
#[derive(Clone)]
pub struct SessionSignals {
    sender: Arc<watch::Sender<SessionStatus>>,
}

impl SessionSignals {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionStatus::Loading);
        Self { sender: Arc::new(sender) }
    }

    pub fn current(&self) -> SessionStatus {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.sender.subscribe()
    }

    /// Publish `status`; subscribers are only woken on an actual change.
    pub fn publish(&self, status: SessionStatus) {
        self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            info!(from = %current, to = %status, "session status changed");
            *current = status;
            true
        });
    }
}

impl Default for SessionSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let signals = SessionSignals::new();
        let mut receiver = signals.subscribe();
        assert!(receiver.borrow().is_loading());

        signals.publish(SessionStatus::Authenticated);
        receiver.changed().await.expect("sender alive");
        assert!(receiver.borrow_and_update().is_authenticated());
    }

    #[test]
    fn repeated_status_does_not_notify() {
        let signals = SessionSignals::new();
        signals.publish(SessionStatus::Authenticated);
        let receiver = signals.subscribe();

        signals.publish(SessionStatus::Authenticated);
        assert!(!receiver.has_changed().expect("sender alive"));
    }
}
