//! Multi-reviewer approval workflow.
//!
//! Tasks move through `draft -> submitted -> in_review -> approved ->
//! completed`, with `rejected -> draft` as the rework loop. While a task is
//! in review every assigned reviewer (or reviewer-team member) records an
//! independent decision; unanimous approval moves the task to `approved`,
//! and any single rejection moves it to `rejected`. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
