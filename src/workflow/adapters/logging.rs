//! Notifier that writes notifications to the tracing log.

use async_trait::async_trait;
use tracing::info;

use crate::workflow::ports::{
    NotificationError, NotificationResult, WorkflowNotification, WorkflowNotifier,
};

/// Notifier for deployments without a delivery channel.
///
/// Each notification is logged with its JSON payload, so a log shipper can
/// forward it to a real channel later.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl WorkflowNotifier for TracingNotifier {
    async fn notify(&self, notification: &WorkflowNotification) -> NotificationResult<()> {
        let payload = serde_json::to_string(notification).map_err(NotificationError::delivery)?;
        info!(
            kind = %notification.kind,
            task_id = %notification.task_id,
            recipients = notification.recipients.len(),
            subject = %notification.subject,
            %payload,
            "workflow notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TracingNotifier;
    use crate::workflow::{
        domain::{TaskId, UserId},
        ports::{NotificationKind, WorkflowNotification, WorkflowNotifier},
    };

    #[tokio::test(flavor = "multi_thread")]
    async fn logs_notification_without_error() {
        let notification = WorkflowNotification {
            kind: NotificationKind::TaskCompleted,
            task_id: TaskId::new(),
            recipients: vec![UserId::new()],
            actor: UserId::new(),
            subject: "\"Payroll\" was completed".to_owned(),
        };

        let result = TracingNotifier.notify(&notification).await;

        assert!(result.is_ok());
    }

    #[test]
    fn payload_uses_snake_case_kind() {
        let notification = WorkflowNotification {
            kind: NotificationKind::ReviewStarted,
            task_id: TaskId::new(),
            recipients: Vec::new(),
            actor: UserId::new(),
            subject: String::new(),
        };

        let payload = serde_json::to_value(&notification).expect("serialise notification");

        assert_eq!(payload["kind"], "review_started");
    }
}
