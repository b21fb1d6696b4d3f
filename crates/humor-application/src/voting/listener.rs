use humor_core::session::SessionSubscription;
use tokio::task::JoinHandle;

use super::controller::VotingController;

/// Keeps a controller subscribed to session-change notifications.
///
/// Transitions are applied in notification order. Caption loads run on their
/// own tasks so a later notification (for example a sign-out) is applied
/// immediately instead of waiting behind a slow load.
///
/// Dropping the listener stops the task and releases the subscription.
pub struct SessionListener {
    handle: JoinHandle<()>,
}

impl SessionListener {
    pub(crate) fn spawn(controller: VotingController, mut subscription: SessionSubscription) -> Self {
        let handle = tokio::spawn(async move {
            while let Some(change) = subscription.recv().await {
                if let Some(epoch) = controller.apply_session_change(change).await {
                    let loader = controller.clone();
                    tokio::spawn(async move { loader.load_working_set(epoch).await });
                }
            }
            tracing::debug!("Session provider closed its notification channel");
        });
        Self { handle }
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
