//! Load, mutate, and persist a task under optimistic concurrency.

use super::{WorkflowServiceError, WorkflowServiceResult};
use crate::workflow::{
    domain::{Task, TaskId, TeamMembership, UserId, WorkflowDomainError},
    ports::{TaskRepository, UserDirectory},
};
use tracing::warn;

/// What a mutation closure decided for the loaded task.
pub(crate) enum Step<T> {
    /// Persist the mutated task.
    Commit(T),
    /// Leave storage untouched.
    Abort(T),
}

/// Task state after a mutation attempt.
pub(crate) struct Mutation<T> {
    pub(crate) task: Task,
    pub(crate) value: T,
    pub(crate) committed: bool,
}

pub(crate) async fn load_task<R>(repository: &R, task_id: TaskId) -> WorkflowServiceResult<Task>
where
    R: TaskRepository + ?Sized,
{
    repository
        .find_by_id(task_id)
        .await?
        .ok_or(WorkflowServiceError::TaskNotFound(task_id))
}

/// Resolves reviewer-team membership. Tasks without a team never query the
/// directory.
pub(crate) async fn resolve_membership<D>(
    directory: &D,
    task: &Task,
    user_id: UserId,
) -> WorkflowServiceResult<TeamMembership>
where
    D: UserDirectory + ?Sized,
{
    let Some(team) = task.reviewer_team() else {
        return Ok(TeamMembership::NonMember);
    };
    let is_member = directory.is_member(team, user_id).await?;
    Ok(TeamMembership::from(is_member))
}

/// Applies read-modify-write cycles against one task.
pub(crate) struct TaskMutator<'a, R: ?Sized, D: ?Sized> {
    repository: &'a R,
    directory: &'a D,
    max_conflict_retries: u32,
}

impl<'a, R, D> TaskMutator<'a, R, D>
where
    R: TaskRepository + ?Sized,
    D: UserDirectory + ?Sized,
{
    pub(crate) const fn new(
        repository: &'a R,
        directory: &'a D,
        max_conflict_retries: u32,
    ) -> Self {
        Self {
            repository,
            directory,
            max_conflict_retries,
        }
    }

    async fn membership(
        &self,
        task: &Task,
        subject: Option<UserId>,
    ) -> WorkflowServiceResult<TeamMembership> {
        let Some(user_id) = subject else {
            return Ok(TeamMembership::NonMember);
        };
        resolve_membership(self.directory, task, user_id).await
    }

    /// Loads the task, resolves `subject`'s membership, and runs `apply`.
    ///
    /// A committed step is written with the loaded version. On a version
    /// conflict the whole cycle reruns against a fresh copy, up to the
    /// configured retry count.
    pub(crate) async fn apply<T, F>(
        &self,
        task_id: TaskId,
        subject: Option<UserId>,
        mut apply: F,
    ) -> WorkflowServiceResult<Mutation<T>>
    where
        F: FnMut(&mut Task, TeamMembership) -> Result<Step<T>, WorkflowDomainError> + Send,
        T: Send,
    {
        let mut retries = 0_u32;
        loop {
            let mut task = load_task(self.repository, task_id).await?;
            let membership = self.membership(&task, subject).await?;

            let value = match apply(&mut task, membership)? {
                Step::Abort(value) => {
                    return Ok(Mutation {
                        task,
                        value,
                        committed: false,
                    });
                }
                Step::Commit(value) => value,
            };

            match self.repository.update(&task).await {
                Ok(version) => {
                    task.set_version(version);
                    return Ok(Mutation {
                        task,
                        value,
                        committed: true,
                    });
                }
                Err(err) if err.is_conflict() && retries < self.max_conflict_retries => {
                    retries = retries.saturating_add(1);
                    warn!(%task_id, retries, "version conflict, retrying task update");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
