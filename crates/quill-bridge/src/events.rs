//! Outbound notification channel.
//!
//! An [`AuthEventEmitter`] implementation backed by a tokio broadcast
//! channel. The shell subscribes once and forwards each `()` tick to its
//! own event system as a payload-free "auth-state-changed" notification;
//! lagging or absent subscribers never block the orchestrator.

use tokio::sync::broadcast;
use tracing::debug;

use quill_sync::AuthEventEmitter;

/// Broadcast-backed auth event relay.
#[derive(Clone)]
pub struct AuthEventChannel {
    sender: broadcast::Sender<()>,
}

impl AuthEventChannel {
    /// Creates a channel with a small buffer; notifications are
    /// re-query triggers, so dropped backlog is harmless.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        AuthEventChannel { sender }
    }

    /// Subscribes to auth-state-changed notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for AuthEventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEventEmitter for AuthEventChannel {
    fn auth_state_changed(&self) {
        // send fails only when no subscriber exists; fire-and-forget.
        let _ = self.sender.send(());
        debug!("auth-state-changed emitted");
    }
}
