//! Streaming call plumbing.
//!
//! - [`accumulator`] - per-call buffer for `StreamingPut`.
//! - [`coordinator`] - response producer for `StreamingGet`.

pub mod accumulator;
pub mod coordinator;
