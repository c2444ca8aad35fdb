//! Fire-and-forget notification dispatch.

use crate::config::NotificationConfig;
use crate::workflow::{
    domain::{Task, UserId},
    ports::{NotificationKind, WorkflowNotification, WorkflowNotifier},
};
use minijinja::{Environment, context};
use std::sync::Arc;
use tracing::{debug, warn};

/// A workflow event waiting to be rendered and delivered.
pub(crate) struct NotificationEvent<'a> {
    pub(crate) kind: NotificationKind,
    pub(crate) task: &'a Task,
    pub(crate) actor: UserId,
    pub(crate) recipients: Vec<UserId>,
    pub(crate) note: Option<&'a str>,
}

/// Renders subjects from configured templates and hands them to a notifier.
///
/// Delivery failures are logged and dropped; a workflow operation never
/// fails because a notification could not be sent.
pub(crate) struct NotificationDispatcher<N: ?Sized> {
    notifier: Arc<N>,
    config: NotificationConfig,
}

impl<N: ?Sized> Clone for NotificationDispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
        }
    }
}

impl<N> NotificationDispatcher<N>
where
    N: WorkflowNotifier + ?Sized,
{
    pub(crate) const fn new(notifier: Arc<N>, config: NotificationConfig) -> Self {
        Self { notifier, config }
    }

    pub(crate) fn set_config(&mut self, config: NotificationConfig) {
        self.config = config;
    }

    pub(crate) fn compose(&self, event: &NotificationEvent<'_>) -> Option<WorkflowNotification> {
        let mut recipients: Vec<UserId> = Vec::with_capacity(event.recipients.len());
        for recipient in &event.recipients {
            if *recipient != event.actor && !recipients.contains(recipient) {
                recipients.push(*recipient);
            }
        }
        if recipients.is_empty() {
            return None;
        }

        let template = self.config.subjects.for_kind(event.kind);
        let subject = render_subject(template, event).unwrap_or_else(|error| {
            warn!(kind = %event.kind, %error, "subject template failed to render");
            format!("{}: {}", event.kind, event.task.title())
        });
        Some(WorkflowNotification {
            kind: event.kind,
            task_id: event.task.id(),
            recipients,
            actor: event.actor,
            subject,
        })
    }

    pub(crate) async fn dispatch(&self, event: NotificationEvent<'_>) {
        if !self.config.enabled {
            return;
        }
        let Some(notification) = self.compose(&event) else {
            debug!(kind = %event.kind, task_id = %event.task.id(), "no notification recipients");
            return;
        };
        if let Err(error) = self.notifier.notify(&notification).await {
            warn!(
                kind = %notification.kind,
                task_id = %notification.task_id,
                %error,
                "notification delivery failed"
            );
        }
    }
}

fn render_subject(
    template: &str,
    event: &NotificationEvent<'_>,
) -> Result<String, minijinja::Error> {
    Environment::new().render_str(
        template,
        context! {
            task_title => event.task.title(),
            actor => event.actor.to_string(),
            note => event.note.unwrap_or_default(),
        },
    )
}
