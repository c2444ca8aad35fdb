//! Error types for workflow domain validation and parsing.

use super::{TaskId, TaskStatus, UserId};
use thiserror::Error;

/// Errors returned while constructing or mutating workflow domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task title exceeds the storable length.
    #[error("task title is {length} characters long; the limit is {max}")]
    TaskTitleTooLong {
        /// Length of the trimmed title in characters.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The requested status change is not an edge of the state machine.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The user already has a reviewer record on the task.
    #[error("user {user_id} is already a reviewer of task {task_id}")]
    DuplicateReviewer {
        /// Task identifier.
        task_id: TaskId,
        /// Reviewer identifier.
        user_id: UserId,
    },

    /// The user has no reviewer record on the task.
    #[error("user {user_id} is not a reviewer of task {task_id}")]
    ReviewerNotFound {
        /// Task identifier.
        task_id: TaskId,
        /// Reviewer identifier.
        user_id: UserId,
    },

    /// The reviewer set cannot change in the task's current status.
    #[error("reviewer set of task {task_id} is locked while {status}")]
    ReviewerSetLocked {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// Review cannot open because nobody is able to review the task.
    #[error("task {task_id} has no reviewers and no reviewer team")]
    NoReviewers {
        /// Task identifier.
        task_id: TaskId,
    },

    /// The acting user may not change the reviewer set.
    #[error("user {user_id} may not manage reviewers of task {task_id}")]
    ReviewerManagementDenied {
        /// Task identifier.
        task_id: TaskId,
        /// Acting user.
        user_id: UserId,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing user roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);
