//! Audit timeline reconstructed from task and reviewer timestamps.

use super::{ReviewDecision, Task, TransitionStamp, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a reconstructed timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    /// Task was created.
    Created,
    /// Task was submitted for review.
    Submitted,
    /// Review was opened.
    ReviewStarted,
    /// One reviewer approved.
    ReviewerApproved,
    /// One reviewer rejected.
    ReviewerRejected,
    /// Consensus approved the task.
    Approved,
    /// A rejection moved the task to `rejected`.
    Rejected,
    /// Task was completed.
    Completed,
}

impl TimelineEventKind {
    /// Returns the canonical event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Submitted => "submitted",
            Self::ReviewStarted => "review_started",
            Self::ReviewerApproved => "reviewer_approved",
            Self::ReviewerRejected => "reviewer_rejected",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

/// A single event in a task's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// What happened.
    pub kind: TimelineEventKind,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Who did it, when known.
    pub actor: Option<UserId>,
    /// Note or reason attached to the event.
    pub note: Option<String>,
}

impl TimelineEvent {
    fn from_stamp(kind: TimelineEventKind, stamp: TransitionStamp, note: Option<&str>) -> Self {
        Self {
            kind,
            at: stamp.at,
            actor: Some(stamp.by),
            note: note.map(ToOwned::to_owned),
        }
    }
}

/// Read-only timeline projection over a borrowed task.
///
/// Nothing is computed until [`TaskTimeline::iter`] is called, and every call
/// rebuilds the sequence from the task's current fields.
#[derive(Debug, Clone, Copy)]
pub struct TaskTimeline<'a> {
    task: &'a Task,
}

impl<'a> TaskTimeline<'a> {
    pub(crate) const fn new(task: &'a Task) -> Self {
        Self { task }
    }

    /// Returns the events in ascending timestamp order.
    ///
    /// Events sharing a timestamp keep lifecycle order, with reviewer
    /// decisions ordered by reviewer `order`.
    #[must_use]
    pub fn iter(&self) -> std::vec::IntoIter<TimelineEvent> {
        let mut events = self.collect_events();
        events.sort_by_key(|(order, event)| (event.at, event.kind, *order));
        events
            .into_iter()
            .map(|(_, event)| event)
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn collect_events(&self) -> Vec<(u32, TimelineEvent)> {
        let task = self.task;
        let mut events = vec![(
            0,
            TimelineEvent {
                kind: TimelineEventKind::Created,
                at: task.created_at(),
                actor: Some(task.owner()),
                note: None,
            },
        )];

        let stamped = [
            (TimelineEventKind::Submitted, task.submitted(), None),
            (TimelineEventKind::ReviewStarted, task.reviewed(), None),
            (TimelineEventKind::Approved, task.approved(), None),
            (
                TimelineEventKind::Rejected,
                task.rejected(),
                task.rejection_reason(),
            ),
            (
                TimelineEventKind::Completed,
                task.completed(),
                task.completion_note(),
            ),
        ];
        events.extend(stamped.into_iter().filter_map(|(kind, stamp, note)| {
            stamp.map(|present| (0, TimelineEvent::from_stamp(kind, present, note)))
        }));

        events.extend(task.reviewers().iter().filter_map(|record| {
            let (kind, at, note) = match record.decision() {
                ReviewDecision::Pending => return None,
                ReviewDecision::Approved { at, note } => {
                    (TimelineEventKind::ReviewerApproved, *at, note.clone())
                }
                ReviewDecision::Rejected { at, note } => {
                    (TimelineEventKind::ReviewerRejected, *at, note.clone())
                }
            };
            Some((
                record.order(),
                TimelineEvent {
                    kind,
                    at,
                    actor: Some(record.user_id()),
                    note,
                },
            ))
        }));
        events
    }
}

impl IntoIterator for TaskTimeline<'_> {
    type Item = TimelineEvent;
    type IntoIter = std::vec::IntoIter<TimelineEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
