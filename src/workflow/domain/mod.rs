//! Domain model for the task approval workflow.
//!
//! The workflow domain models the task state machine, per-reviewer decision
//! records, the derived consensus snapshot, and the audit timeline. All
//! infrastructure concerns are kept outside the domain boundary.

mod actor;
mod approval;
mod error;
mod ids;
mod reviewer;
mod status;
mod task;
mod timeline;

pub use actor::{Actor, TeamMembership, UserRole};
pub use approval::{
    ApprovalStatus, ConsensusDecision, ReviewEligibility, ReviewOutcome, ReviewerSource,
    consensus_decision,
};
pub use error::{ParseTaskStatusError, ParseUserRoleError, WorkflowDomainError};
pub use ids::{TaskId, TeamId, UserId};
pub use reviewer::{ReviewDecision, ReviewerRecord};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task, TransitionStamp};
pub use timeline::{TaskTimeline, TimelineEvent, TimelineEventKind};
