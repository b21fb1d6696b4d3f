//! Broadcast plumbing for session-change notifications.
//!
//! Providers own a [`SessionBroadcaster`]; every call to `subscribe` hands out
//! an independent [`SessionSubscription`]. Dropping the subscription is the
//! unsubscribe operation.

use tokio::sync::broadcast::{self, error::RecvError};

use super::event::SessionChange;

const DEFAULT_CAPACITY: usize = 16;

/// Fan-out sender for session-change notifications.
#[derive(Debug, Clone)]
pub struct SessionBroadcaster {
    sender: broadcast::Sender<SessionChange>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to every live subscription.
    ///
    /// Returns the number of subscriptions that received it.
    pub fn publish(&self, change: SessionChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to session-change notifications.
///
/// The subscription is released when this value is dropped.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionChange>,
}

impl SessionSubscription {
    /// Waits for the next notification.
    ///
    /// Returns `None` once the provider has gone away. If this subscriber fell
    /// behind, the overwritten notifications are skipped and the oldest retained
    /// one is returned.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Explicitly releases the subscription.
    pub fn unsubscribe(self) {}
}
