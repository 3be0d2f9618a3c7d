use log::{debug, warn};
use tokio::sync::mpsc::error::TrySendError;

use crate::chat::registry::ConnectionRegistry;

#[derive(Clone)]
pub struct BroadcastService {
    registry: ConnectionRegistry,
}

impl BroadcastService {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Sends `text` to everyone registered at call time and returns how many
    /// recipients accepted it. Closed or backed-up recipients are skipped, never awaited.
    pub fn broadcast(&self, text: &str) -> usize {
        let recipients = self.registry.snapshot();
        if recipients.is_empty() {
            debug!("No connected clients, dropping broadcast");
            return 0;
        }

        let mut delivered = 0;
        for recipient in &recipients {
            match recipient.send(text.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Skipping {}: outbound queue is full", recipient.peer_addr())
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("Skipping {}: connection already closed", recipient.peer_addr())
                }
            }
        }

        debug!("Broadcast delivered to {}/{} clients", delivered, recipients.len());
        delivered
    }
}
