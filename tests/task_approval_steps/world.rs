//! Shared world state for task approval BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taxflow::workflow::{
    adapters::memory::{InMemoryNotifier, InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Actor, Task, UserId},
    services::{ReviewResult, TransitionResult, WorkflowService},
};

/// Service type used by the BDD world.
pub type TestWorkflowService =
    WorkflowService<InMemoryTaskRepository, InMemoryUserDirectory, InMemoryNotifier, DefaultClock>;

/// Scenario world for approval behaviour tests.
pub struct ApprovalWorld {
    pub service: TestWorkflowService,
    pub people: HashMap<String, Actor>,
    pub owner: Option<String>,
    pub reviewers: Vec<String>,
    pub task: Option<Task>,
    pub last_review: Option<ReviewResult>,
    pub last_transition: Option<TransitionResult>,
}

impl ApprovalWorld {
    /// Creates a world with no people or tasks.
    #[must_use]
    pub fn new() -> Self {
        let service = WorkflowService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryNotifier::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            people: HashMap::new(),
            owner: None,
            reviewers: Vec::new(),
            task: None,
            last_review: None,
            last_transition: None,
        }
    }

    /// Returns the actor for `name`, registering a member on first use.
    pub fn person(&mut self, name: &str) -> Actor {
        *self
            .people
            .entry(name.to_owned())
            .or_insert_with(|| Actor::member(UserId::new()))
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for ApprovalWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ApprovalWorld {
    ApprovalWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
