//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taxflow::{
    config::WorkflowConfig,
    workflow::{
        adapters::memory::{InMemoryNotifier, InMemoryTaskRepository, InMemoryUserDirectory},
        domain::{Actor, Task, UserId, UserRole},
        services::{NewTaskRequest, WorkflowService},
    },
};

/// Workflow service type wired to in-memory adapters.
pub type MemoryWorkflow =
    WorkflowService<InMemoryTaskRepository, InMemoryUserDirectory, InMemoryNotifier, DefaultClock>;

/// Service plus handles on its adapters.
pub struct Stack {
    pub service: MemoryWorkflow,
    pub repository: Arc<InMemoryTaskRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<InMemoryNotifier>,
}

impl Stack {
    /// Builds a stack with the given configuration.
    pub fn with_config(config: &WorkflowConfig) -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let notifier = Arc::new(InMemoryNotifier::new());
        let service = WorkflowService::new(
            Arc::clone(&repository),
            Arc::clone(&directory),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        )
        .with_config(config);
        Self {
            service,
            repository,
            directory,
            notifier,
        }
    }

    /// Creates a task with `reviewers` and drives it to `in_review`.
    ///
    /// # Errors
    ///
    /// Returns an error when any service call fails or is refused.
    pub async fn task_in_review(
        &self,
        owner: &Actor,
        reviewers: &[UserId],
    ) -> Result<Task, eyre::Report> {
        let created = self
            .service
            .create_task(
                NewTaskRequest::new("Statutory accounts", owner.user_id())
                    .with_reviewers(reviewers.iter().copied()),
            )
            .await?;
        let submitted = self.service.submit_for_review(created.id(), owner).await?;
        eyre::ensure!(submitted.outcome.is_success(), "{}", submitted.message);
        let opened = self
            .service
            .start_review(created.id(), &privileged())
            .await?;
        eyre::ensure!(opened.outcome.is_success(), "{}", opened.message);
        Ok(opened.task)
    }
}

/// Provides a stack with default configuration.
#[fixture]
pub fn stack() -> Stack {
    Stack::with_config(&WorkflowConfig::default())
}

/// Returns a manager unrelated to any task.
pub fn privileged() -> Actor {
    Actor::new(UserId::new(), UserRole::Manager)
}

/// Returns `count` fresh member actors.
pub fn members(count: usize) -> Vec<Actor> {
    (0..count).map(|_| Actor::member(UserId::new())).collect()
}
