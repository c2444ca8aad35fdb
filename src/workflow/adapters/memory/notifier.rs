//! Recording notifier for tests.

use async_trait::async_trait;
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::workflow::ports::{
    NotificationError, NotificationResult, WorkflowNotification, WorkflowNotifier,
};

/// Notifier that keeps every delivered notification in memory.
///
/// Switching it to failing mode makes every delivery return an error, which
/// exercises the swallow-and-log path of the services.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    delivered: Arc<RwLock<Vec<WorkflowNotification>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryNotifier {
    /// Creates a notifier that accepts every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that rejects every delivery.
    #[must_use]
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    /// Toggles failing mode.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the notifications delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<WorkflowNotification> {
        self.delivered
            .read()
            .map(|delivered| delivered.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WorkflowNotifier for InMemoryNotifier {
    async fn notify(&self, notification: &WorkflowNotification) -> NotificationResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::delivery(std::io::Error::other(
                "notifier configured to fail",
            )));
        }
        let mut delivered = self.delivered.write().map_err(|err| {
            NotificationError::delivery(std::io::Error::other(err.to_string()))
        })?;
        delivered.push(notification.clone());
        Ok(())
    }
}
