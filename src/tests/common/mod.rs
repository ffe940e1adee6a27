//! Common Test Utilities
//!
//! Shared entity fixtures and store builders used across test modules.

pub mod fixtures;

pub use fixtures::*;
