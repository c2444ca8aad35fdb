//! Shared fixtures for workflow unit tests.

use crate::workflow::{
    adapters::memory::{InMemoryNotifier, InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Actor, Task, TaskId, UserId, UserRole},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    services::{NewTaskRequest, WorkflowService},
};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{
    Arc,
    atomic::{AtomicI64, AtomicU32, Ordering},
};

/// Clock that advances one second on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2026, 4, 15, 9, 0, 0)
                .single()
                .expect("valid start instant"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::seconds(tick)
    }
}

/// Repository that lets a rival writer bump the stored version before each of
/// the first `interference` updates.
pub struct ContendedRepository {
    inner: InMemoryTaskRepository,
    interference: AtomicU32,
}

impl ContendedRepository {
    pub fn new(interference: u32) -> Self {
        Self {
            inner: InMemoryTaskRepository::new(),
            interference: AtomicU32::new(interference),
        }
    }

    async fn rival_write(&self, task_id: TaskId) -> TaskRepositoryResult<()> {
        let stored = self
            .inner
            .find_by_id(task_id)
            .await?
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
        self.inner.update(&stored).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for ContendedRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<u64> {
        let remaining = self.interference.load(Ordering::SeqCst);
        if remaining > 0 {
            self.interference.store(remaining - 1, Ordering::SeqCst);
            self.rival_write(task.id()).await?;
        }
        self.inner.update(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_reviewer(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_by_reviewer(user_id).await
    }
}

/// A privileged actor unrelated to any task.
pub fn manager() -> Actor {
    Actor::new(UserId::new(), UserRole::Manager)
}

pub type MemoryWorkflow =
    WorkflowService<InMemoryTaskRepository, InMemoryUserDirectory, InMemoryNotifier, SteppingClock>;

/// Workflow service wired to in-memory adapters, with handles on the
/// adapters for arrangement and inspection.
pub struct Harness {
    pub service: MemoryWorkflow,
    pub repository: Arc<InMemoryTaskRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<InMemoryNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let notifier = Arc::new(InMemoryNotifier::new());
        let repository = Arc::new(InMemoryTaskRepository::new());
        let service = WorkflowService::new(
            Arc::clone(&repository),
            Arc::clone(&directory),
            Arc::clone(&notifier),
            Arc::new(SteppingClock::new()),
        );
        Self {
            service,
            repository,
            directory,
            notifier,
        }
    }

    /// Creates a task owned by `owner` with `reviewers` and drives it to
    /// `in_review`.
    pub async fn task_in_review(&self, owner: &Actor, reviewers: &[UserId]) -> Task {
        let task = self
            .service
            .create_task(
                NewTaskRequest::new("Annual accounts", owner.user_id())
                    .with_reviewers(reviewers.iter().copied()),
            )
            .await
            .expect("task created");
        self.submit_and_open(task.id(), owner).await
    }

    pub async fn submit_and_open(&self, task_id: TaskId, owner: &Actor) -> Task {
        let submitted = self
            .service
            .submit_for_review(task_id, owner)
            .await
            .expect("submit succeeds");
        assert!(submitted.outcome.is_success(), "{}", submitted.message);
        let opened = self
            .service
            .start_review(task_id, &manager())
            .await
            .expect("start review succeeds");
        assert!(opened.outcome.is_success(), "{}", opened.message);
        opened.task
    }
}
