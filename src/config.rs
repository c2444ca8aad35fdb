//! Workflow configuration loading.
//!
//! Configuration is read from TOML. Every section and key is optional and
//! falls back to the defaults below.
//!
//! ```toml
//! [concurrency]
//! max_conflict_retries = 5
//!
//! [notifications]
//! enabled = true
//!
//! [notifications.subjects]
//! task_rejected = "Rejected: {{ task_title }}"
//! ```

use crate::workflow::ports::NotificationKind;
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A notification subject template does not compile.
    #[error("invalid {kind} subject template: {reason}")]
    InvalidTemplate {
        /// Notification the template belongs to.
        kind: NotificationKind,
        /// Template compiler message.
        reason: String,
    },
}

/// Root configuration for the workflow services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Optimistic concurrency settings.
    pub concurrency: ConcurrencyConfig,
    /// Notification settings.
    pub notifications: NotificationConfig,
}

impl WorkflowConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::InvalidTemplate`] when a subject template fails to
    /// compile.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.notifications.subjects.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, and the
    /// errors of [`WorkflowConfig::from_toml_str`] otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_path = path.as_ref();
        let raw = std::fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

/// Optimistic concurrency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// How many times a conflicting write is retried before giving up.
    pub max_conflict_retries: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// When `false`, no notifications are dispatched.
    pub enabled: bool,
    /// Subject line templates.
    pub subjects: SubjectTemplates,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subjects: SubjectTemplates::default(),
        }
    }
}

/// `minijinja` subject templates, one per notification kind.
///
/// Templates see `task_title`, `actor`, and `note` (empty when absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectTemplates {
    /// Subject for [`NotificationKind::TaskSubmitted`].
    pub task_submitted: String,
    /// Subject for [`NotificationKind::ReviewStarted`].
    pub review_started: String,
    /// Subject for [`NotificationKind::ReviewerAdded`].
    pub reviewer_added: String,
    /// Subject for [`NotificationKind::TaskApproved`].
    pub task_approved: String,
    /// Subject for [`NotificationKind::TaskRejected`].
    pub task_rejected: String,
    /// Subject for [`NotificationKind::TaskCompleted`].
    pub task_completed: String,
    /// Subject for [`NotificationKind::TaskRestarted`].
    pub task_restarted: String,
}

impl SubjectTemplates {
    /// Returns the template source for `kind`.
    #[must_use]
    pub fn for_kind(&self, kind: NotificationKind) -> &str {
        match kind {
            NotificationKind::TaskSubmitted => &self.task_submitted,
            NotificationKind::ReviewStarted => &self.review_started,
            NotificationKind::ReviewerAdded => &self.reviewer_added,
            NotificationKind::TaskApproved => &self.task_approved,
            NotificationKind::TaskRejected => &self.task_rejected,
            NotificationKind::TaskCompleted => &self.task_completed,
            NotificationKind::TaskRestarted => &self.task_restarted,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let environment = Environment::new();
        let kinds = [
            NotificationKind::TaskSubmitted,
            NotificationKind::ReviewStarted,
            NotificationKind::ReviewerAdded,
            NotificationKind::TaskApproved,
            NotificationKind::TaskRejected,
            NotificationKind::TaskCompleted,
            NotificationKind::TaskRestarted,
        ];
        for kind in kinds {
            environment
                .template_from_str(self.for_kind(kind))
                .map_err(|error| ConfigError::InvalidTemplate {
                    kind,
                    reason: error.to_string(),
                })?;
        }
        Ok(())
    }
}

impl Default for SubjectTemplates {
    fn default() -> Self {
        Self {
            task_submitted: "\"{{ task_title }}\" was submitted for review".to_owned(),
            review_started: "Review started for \"{{ task_title }}\"".to_owned(),
            reviewer_added: "You were added as a reviewer on \"{{ task_title }}\"".to_owned(),
            task_approved: "\"{{ task_title }}\" was approved".to_owned(),
            task_rejected: "\"{{ task_title }}\" was rejected{% if note %}: {{ note }}{% endif %}"
                .to_owned(),
            task_completed: "\"{{ task_title }}\" was completed".to_owned(),
            task_restarted: "\"{{ task_title }}\" was reopened as a draft".to_owned(),
        }
    }
}
