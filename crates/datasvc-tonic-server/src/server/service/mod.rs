//! gRPC service implementation and call lifecycle.
//!
//! This module contains the core logic for handling client-facing gRPC
//! calls: the unary `Get`, the server-streaming `StreamingGet`, and the
//! client-streaming `StreamingPut`, plus the graceful-drain side of
//! shutdown.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`DataHandler`).

pub mod handler;
