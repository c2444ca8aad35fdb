//! User directory port for reviewer-team membership.

use crate::workflow::domain::{TeamId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Resolves team membership for ad-hoc reviewers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `true` when `user` belongs to `team`.
    async fn is_member(&self, team: TeamId, user: UserId) -> DirectoryResult<bool>;
}

/// Errors returned by user directory adapters.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The directory backend is unavailable.
    #[error("user directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
