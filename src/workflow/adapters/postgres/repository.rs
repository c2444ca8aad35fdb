//! `PostgreSQL` repository implementation for workflow storage.

use super::{
    mapping::{row_to_task, to_reviewer_rows, to_task_record},
    models::{ReviewerRow, TaskRow},
    schema::{task_reviewers, workflow_tasks},
};
use crate::workflow::{
    domain::{Task, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Each write runs in one transaction. Updates are guarded by
/// `WHERE version = <loaded version>`, so concurrent writers on the same
/// task serialize through [`TaskRepositoryError::VersionConflict`].
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: WorkflowPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let record = to_task_record(task)?;
        let reviewer_rows = to_reviewer_rows(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(workflow_tasks::table)
                    .values(&record)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                insert_reviewers(tx, &reviewer_rows)
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<u64> {
        let task_id = task.id();
        let expected = i64::try_from(task.version()).map_err(TaskRepositoryError::persistence)?;
        let next_version = task.version().saturating_add(1);
        let mut record = to_task_record(task)?;
        record.version = i64::try_from(next_version).map_err(TaskRepositoryError::persistence)?;
        let reviewer_rows = to_reviewer_rows(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    workflow_tasks::table
                        .filter(workflow_tasks::id.eq(task_id.into_inner()))
                        .filter(workflow_tasks::version.eq(expected)),
                )
                .set(&record)
                .execute(tx)?;

                if updated == 0 {
                    return Err(missing_or_conflict(tx, task_id, expected)?);
                }

                diesel::delete(
                    task_reviewers::table.filter(task_reviewers::task_id.eq(task_id.into_inner())),
                )
                .execute(tx)?;
                insert_reviewers(tx, &reviewer_rows)?;
                Ok(next_version)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = workflow_tasks::table
                .filter(workflow_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let reviewer_rows = task_reviewers::table
                .filter(task_reviewers::task_id.eq(task_row.id))
                .order(task_reviewers::review_order.asc())
                .select(ReviewerRow::as_select())
                .load::<ReviewerRow>(connection)?;
            row_to_task(task_row, reviewer_rows).map(Some)
        })
        .await
    }

    async fn find_by_reviewer(&self, user_id: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let task_ids = task_reviewers::table
                .filter(task_reviewers::user_id.eq(user_id.into_inner()))
                .select(task_reviewers::task_id)
                .load::<Uuid>(connection)?;
            if task_ids.is_empty() {
                return Ok(Vec::new());
            }

            let task_rows = workflow_tasks::table
                .filter(workflow_tasks::id.eq_any(task_ids.clone()))
                .order(workflow_tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            let reviewer_rows = task_reviewers::table
                .filter(task_reviewers::task_id.eq_any(task_ids))
                .order((
                    task_reviewers::task_id.asc(),
                    task_reviewers::review_order.asc(),
                ))
                .select(ReviewerRow::as_select())
                .load::<ReviewerRow>(connection)?;

            let mut grouped: HashMap<Uuid, Vec<ReviewerRow>> = HashMap::new();
            for reviewer_row in reviewer_rows {
                grouped
                    .entry(reviewer_row.task_id)
                    .or_default()
                    .push(reviewer_row);
            }
            task_rows
                .into_iter()
                .map(|task_row| {
                    let reviewers = grouped.remove(&task_row.id).unwrap_or_default();
                    row_to_task(task_row, reviewers)
                })
                .collect()
        })
        .await
    }
}

fn insert_reviewers(
    connection: &mut PgConnection,
    reviewer_rows: &[ReviewerRow],
) -> TaskRepositoryResult<()> {
    if reviewer_rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_reviewers::table)
        .values(reviewer_rows)
        .execute(connection)?;
    Ok(())
}

/// Explains why a version-guarded update touched no rows.
fn missing_or_conflict(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: i64,
) -> TaskRepositoryResult<TaskRepositoryError> {
    let stored = workflow_tasks::table
        .filter(workflow_tasks::id.eq(task_id.into_inner()))
        .select(workflow_tasks::version)
        .first::<i64>(connection)
        .optional()?;
    Ok(stored.map_or(TaskRepositoryError::NotFound(task_id), |actual| {
        TaskRepositoryError::VersionConflict {
            task_id,
            expected: u64::try_from(expected).unwrap_or_default(),
            actual: u64::try_from(actual).unwrap_or_default(),
        }
    }))
}
