//! Notification port for fire-and-forget workflow side effects.

use crate::workflow::domain::{TaskId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Workflow event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task entered `submitted`.
    TaskSubmitted,
    /// A task entered `in_review`.
    ReviewStarted,
    /// A reviewer was assigned to a task.
    ReviewerAdded,
    /// Consensus approved a task.
    TaskApproved,
    /// A reviewer rejected a task.
    TaskRejected,
    /// A task was completed.
    TaskCompleted,
    /// A rejected task returned to `draft`.
    TaskRestarted,
}

impl NotificationKind {
    /// Returns the canonical notification name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskSubmitted => "task_submitted",
            Self::ReviewStarted => "review_started",
            Self::ReviewerAdded => "reviewer_added",
            Self::TaskApproved => "task_approved",
            Self::TaskRejected => "task_rejected",
            Self::TaskCompleted => "task_completed",
            Self::TaskRestarted => "task_restarted",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNotification {
    /// Event being reported.
    pub kind: NotificationKind,
    /// Task the event concerns.
    pub task_id: TaskId,
    /// Users to notify.
    pub recipients: Vec<UserId>,
    /// User whose action triggered the event.
    pub actor: UserId,
    /// Rendered subject line.
    pub subject: String,
}

/// Delivery contract for email, websocket, or other channels.
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    /// Delivers a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails. Callers log and
    /// discard these errors.
    async fn notify(&self, notification: &WorkflowNotification) -> NotificationResult<()>;
}

/// Errors returned by notifier adapters.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The delivery channel rejected or dropped the notification.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a delivery failure.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
