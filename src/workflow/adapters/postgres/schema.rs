//! Diesel schema for workflow persistence.

diesel::table! {
    /// Workflowed task records.
    workflow_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Owning user.
        owner_id -> Uuid,
        /// Workflow status.
        #[max_length = 32]
        status -> Varchar,
        /// Optional reviewer team.
        reviewer_team_id -> Nullable<Uuid>,
        /// Latest submitter.
        submitted_by -> Nullable<Uuid>,
        /// Latest submission time.
        submitted_at -> Nullable<Timestamptz>,
        /// Latest review opener.
        reviewed_by -> Nullable<Uuid>,
        /// Latest review start time.
        reviewed_at -> Nullable<Timestamptz>,
        /// Reviewer completing the consensus.
        approved_by -> Nullable<Uuid>,
        /// Approval time.
        approved_at -> Nullable<Timestamptz>,
        /// Rejecting reviewer.
        rejected_by -> Nullable<Uuid>,
        /// Rejection time.
        rejected_at -> Nullable<Timestamptz>,
        /// Completing user.
        completed_by -> Nullable<Uuid>,
        /// Completion time.
        completed_at -> Nullable<Timestamptz>,
        /// Reason given with the rejection.
        rejection_reason -> Nullable<Text>,
        /// Note given on completion.
        completion_note -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Optimistic concurrency version.
        version -> Int8,
    }
}

diesel::table! {
    /// Per-reviewer decision records.
    task_reviewers (task_id, user_id) {
        /// Owning task.
        task_id -> Uuid,
        /// Reviewing user.
        user_id -> Uuid,
        /// Informational sequencing hint.
        review_order -> Int4,
        /// Assignment time.
        assigned_at -> Timestamptz,
        /// Approval flag.
        has_approved -> Bool,
        /// Approval time.
        approved_at -> Nullable<Timestamptz>,
        /// Approval note.
        approval_note -> Nullable<Text>,
        /// Rejection flag.
        has_rejected -> Bool,
        /// Rejection time.
        rejected_at -> Nullable<Timestamptz>,
        /// Rejection note.
        rejection_note -> Nullable<Text>,
    }
}

diesel::joinable!(task_reviewers -> workflow_tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(workflow_tasks, task_reviewers);
