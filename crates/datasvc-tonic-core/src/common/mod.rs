pub mod error;

pub use error::{Error, Result};

/// Generated protocol types for the `datasvc` package.
///
/// Includes the message types, the `DataService` client and server
/// stubs, and the encoded file descriptor set used for gRPC server
/// reflection.
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/datasvc.rs"));

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("datasvc_descriptor");
}
