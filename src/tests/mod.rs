//! Crate-level tests
//!
//! Per-module unit tests live next to the code they cover. This module holds
//! shared fixtures and the property-based suites that span several modules.

pub mod common;
mod property;
