//! Application services for the approval workflow.

mod approval;
mod error;
pub(crate) mod mutation;
pub(crate) mod notify;
mod timeline;
mod transitions;

pub use approval::{ApprovalService, ReviewResult};
pub use error::{WorkflowServiceError, WorkflowServiceResult};
pub use timeline::TimelineService;
pub use transitions::{NewTaskRequest, TransitionOutcome, TransitionResult, WorkflowService};
