//! `PostgreSQL` adapters for workflow persistence.

mod mapping;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, WorkflowPgPool};
