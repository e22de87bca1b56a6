//! Error types for the data service.
//!
//! This module defines the central `Error` enum, which captures the
//! reportable error cases within the call-handling core. It implements
//! `From<Error>` for `tonic::Status` to enable seamless gRPC error
//! propagation to clients with appropriate status codes and messages.
//!
//! ## Error Cases
//! - `ChannelError`: An internal communication failure between the
//!   handler and the response stream.
//! - `ServiceShutdown`: A call arrived while the service was shutting
//!   down.
//!
//! Transport-level errors on an inbound client stream are not modeled
//! here: the handler propagates the original `tonic::Status` so the
//! caller sees the transport's own diagnosis.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the data service call-handling core.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {}", context))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn channel_error_maps_to_internal() {
        let status: Status = Error::ChannelError {
            context: "response stream closed".to_string(),
        }
        .into();
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("response stream closed"));
    }

    #[test]
    fn shutdown_maps_to_unavailable() {
        let status: Status = Error::ServiceShutdown.into();
        assert_eq!(status.code(), Code::Unavailable);
    }
}
