//! Property-based tests for the comparison engine
//!
//! ## Test Modules
//!
//! - `matcher_props`: archetype matching
//!   - Matching is deterministic
//!   - Hit counts are bounded by the vocabulary and agree with the threshold
//!   - Score of a single entity equals its hit count
//!   - A group score lies between the member hit counts
//!
//! - `comparison_props`: comparison construction
//!   - Shared-set similarities are order independent
//!   - Shared values are sorted and lowercased
//!   - Field alignment covers every field exactly once
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable.

mod comparison_props;
mod matcher_props;
