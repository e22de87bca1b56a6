//! Server internals for the data service binary.
//!
//! - [`config`] - CLI/env configuration and validation.
//! - [`metrics`] - process-wide counters and the exposition endpoint.
//! - [`service`] - gRPC call handlers and lifecycle.
//! - [`streaming`] - streaming call plumbing (producer, accumulator).
//! - [`telemetry`] - log subscriber setup.
//! - [`transform`] - the pluggable request transform.

pub mod config;
pub mod metrics;
pub mod service;
pub mod streaming;
pub mod telemetry;
pub mod transform;
