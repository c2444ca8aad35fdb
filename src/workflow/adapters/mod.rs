//! Adapter implementations for workflow ports.

pub mod logging;
pub mod memory;
pub mod postgres;
