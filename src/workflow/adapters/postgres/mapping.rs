//! Conversions between diesel rows and workflow domain types.

use super::models::{ReviewerRow, TaskRecord, TaskRow};
use crate::workflow::{
    domain::{
        PersistedTaskData, ReviewDecision, ReviewerRecord, Task, TaskId, TaskStatus, TeamId,
        TransitionStamp, UserId,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Data-quality problems found in persisted rows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowMappingError {
    /// Only one half of a `*_by` / `*_at` pair is set.
    #[error("task {task_id}: {column}_by and {column}_at must be set together")]
    HalfStamp {
        /// Task identifier.
        task_id: Uuid,
        /// Column prefix.
        column: &'static str,
    },

    /// A reviewer row is marked both approved and rejected, or a flag lacks
    /// its timestamp.
    #[error("reviewer {user_id} on task {task_id} has an inconsistent decision")]
    InconsistentDecision {
        /// Task identifier.
        task_id: Uuid,
        /// Reviewer identifier.
        user_id: Uuid,
    },

    /// A numeric column is outside the domain range.
    #[error("task {task_id}: {column} value {value} is out of range")]
    OutOfRange {
        /// Task identifier.
        task_id: Uuid,
        /// Column name.
        column: &'static str,
        /// Stored value.
        value: i64,
    },
}

pub(super) fn to_task_record(task: &Task) -> TaskRepositoryResult<TaskRecord> {
    let version = i64::try_from(task.version()).map_err(TaskRepositoryError::persistence)?;
    let (submitted_by, submitted_at) = split_stamp(task.submitted());
    let (reviewed_by, reviewed_at) = split_stamp(task.reviewed());
    let (approved_by, approved_at) = split_stamp(task.approved());
    let (rejected_by, rejected_at) = split_stamp(task.rejected());
    let (completed_by, completed_at) = split_stamp(task.completed());

    Ok(TaskRecord {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        owner_id: task.owner().into_inner(),
        status: task.status().as_str().to_owned(),
        reviewer_team_id: task.reviewer_team().map(TeamId::into_inner),
        submitted_by,
        submitted_at,
        reviewed_by,
        reviewed_at,
        approved_by,
        approved_at,
        rejected_by,
        rejected_at,
        completed_by,
        completed_at,
        rejection_reason: task.rejection_reason().map(ToOwned::to_owned),
        completion_note: task.completion_note().map(ToOwned::to_owned),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        version,
    })
}

pub(super) fn to_reviewer_rows(task: &Task) -> TaskRepositoryResult<Vec<ReviewerRow>> {
    let task_id = task.id().into_inner();
    task.reviewers()
        .iter()
        .map(|record| {
            let review_order =
                i32::try_from(record.order()).map_err(TaskRepositoryError::persistence)?;
            let (approved_at, approval_note, rejected_at, rejection_note) =
                match record.decision() {
                    ReviewDecision::Pending => (None, None, None, None),
                    ReviewDecision::Approved { at, note } => (Some(*at), note.clone(), None, None),
                    ReviewDecision::Rejected { at, note } => (None, None, Some(*at), note.clone()),
                };
            Ok(ReviewerRow {
                task_id,
                user_id: record.user_id().into_inner(),
                review_order,
                assigned_at: record.assigned_at(),
                has_approved: record.has_approved(),
                approved_at,
                approval_note,
                has_rejected: record.has_rejected(),
                rejected_at,
                rejection_note,
            })
        })
        .collect()
}

pub(super) fn row_to_task(
    row: TaskRow,
    reviewer_rows: Vec<ReviewerRow>,
) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        owner_id,
        status: persisted_status,
        reviewer_team_id,
        submitted_by,
        submitted_at,
        reviewed_by,
        reviewed_at,
        approved_by,
        approved_at,
        rejected_by,
        rejected_at,
        completed_by,
        completed_at,
        rejection_reason,
        completion_note,
        created_at,
        updated_at,
        version: persisted_version,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    let version = u64::try_from(persisted_version).map_err(|_| {
        TaskRepositoryError::invalid_persisted_data(RowMappingError::OutOfRange {
            task_id: id,
            column: "version",
            value: persisted_version,
        })
    })?;
    let reviewers = reviewer_rows
        .into_iter()
        .map(row_to_reviewer)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TaskRepositoryError::invalid_persisted_data)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        owner: UserId::from_uuid(owner_id),
        status,
        reviewer_team: reviewer_team_id.map(TeamId::from_uuid),
        reviewers,
        submitted: join_stamp(id, "submitted", submitted_by, submitted_at)?,
        reviewed: join_stamp(id, "reviewed", reviewed_by, reviewed_at)?,
        approved: join_stamp(id, "approved", approved_by, approved_at)?,
        rejected: join_stamp(id, "rejected", rejected_by, rejected_at)?,
        completed: join_stamp(id, "completed", completed_by, completed_at)?,
        rejection_reason,
        completion_note,
        created_at,
        updated_at,
        version,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_reviewer(row: ReviewerRow) -> Result<ReviewerRecord, RowMappingError> {
    let inconsistent = RowMappingError::InconsistentDecision {
        task_id: row.task_id,
        user_id: row.user_id,
    };
    let order = u32::try_from(row.review_order).map_err(|_| RowMappingError::OutOfRange {
        task_id: row.task_id,
        column: "review_order",
        value: i64::from(row.review_order),
    })?;
    let decision = match (row.has_approved, row.has_rejected) {
        (false, false) => ReviewDecision::Pending,
        (true, false) => ReviewDecision::Approved {
            at: row.approved_at.ok_or(inconsistent)?,
            note: row.approval_note,
        },
        (false, true) => ReviewDecision::Rejected {
            at: row.rejected_at.ok_or(inconsistent)?,
            note: row.rejection_note,
        },
        (true, true) => return Err(inconsistent),
    };
    Ok(ReviewerRecord::from_persisted(
        UserId::from_uuid(row.user_id),
        order,
        row.assigned_at,
        decision,
    ))
}

fn split_stamp(stamp: Option<TransitionStamp>) -> (Option<Uuid>, Option<DateTime<Utc>>) {
    stamp.map_or((None, None), |present| {
        (Some(present.by.into_inner()), Some(present.at))
    })
}

fn join_stamp(
    task_id: Uuid,
    column: &'static str,
    by: Option<Uuid>,
    at: Option<DateTime<Utc>>,
) -> TaskRepositoryResult<Option<TransitionStamp>> {
    match (by, at) {
        (Some(user), Some(instant)) => Ok(Some(TransitionStamp {
            by: UserId::from_uuid(user),
            at: instant,
        })),
        (None, None) => Ok(None),
        _ => Err(TaskRepositoryError::invalid_persisted_data(
            RowMappingError::HalfStamp { task_id, column },
        )),
    }
}
