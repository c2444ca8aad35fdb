//! Read-only audit timeline access.

use super::{WorkflowServiceResult, mutation::load_task};
use crate::workflow::{
    domain::{TaskId, TimelineEvent},
    ports::TaskRepository,
};
use std::sync::Arc;

/// Serves reconstructed task timelines.
#[derive(Clone)]
pub struct TimelineService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> TimelineService<R>
where
    R: TaskRepository,
{
    /// Creates a new timeline service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the task's events in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::TaskNotFound`] for unknown
    /// tasks and repository errors otherwise.
    pub async fn timeline(&self, task_id: TaskId) -> WorkflowServiceResult<Vec<TimelineEvent>> {
        let task = load_task(&*self.repository, task_id).await?;
        Ok(task.timeline().iter().collect())
    }
}
