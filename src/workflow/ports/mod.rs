//! Port contracts for the approval workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by workflow services.

pub mod directory;
pub mod notifier;
pub mod repository;

#[cfg(test)]
pub use directory::MockUserDirectory;
pub use directory::{DirectoryError, DirectoryResult, UserDirectory};
pub use notifier::{
    NotificationError, NotificationKind, NotificationResult, WorkflowNotification,
    WorkflowNotifier,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
