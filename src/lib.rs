//! Taxflow: approval workflow engine for accounting tasks.
//!
//! This crate coordinates tasks that need sign-off from several reviewers
//! before they can be completed. It tracks per-reviewer decisions, derives
//! consensus, drives the task status state machine, and reconstructs an audit
//! timeline from recorded timestamps.
//!
//! # Architecture
//!
//! Taxflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, team lookup, and
//!   notification delivery
//! - **Adapters**: In-memory, `PostgreSQL`, and tracing implementations
//!
//! # Modules
//!
//! - [`workflow`]: Task state machine, approval engine, and timeline
//! - [`config`]: TOML configuration for retries and notifications
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod telemetry;
pub mod workflow;
