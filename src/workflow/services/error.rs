//! Service-level error type shared by the workflow services.

use crate::workflow::{
    domain::{TaskId, WorkflowDomainError},
    ports::{DirectoryError, TaskRepositoryError},
};
use thiserror::Error;

/// Errors returned by workflow service operations.
///
/// Business refusals such as a wrong status or a missing capability are not
/// errors; they are reported through the typed outcome of each operation.
#[derive(Debug, Error)]
pub enum WorkflowServiceError {
    /// No task exists with the identifier.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Repository operation failed, including exhausted conflict retries.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Team membership could not be resolved.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for workflow service operations.
pub type WorkflowServiceResult<T> = Result<T, WorkflowServiceError>;
