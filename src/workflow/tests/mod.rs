//! Unit tests for the approval workflow.

mod support;
