//! Error types for TetherDB.

use thiserror::Error;

/// Result type alias using TetherError.
pub type Result<T> = std::result::Result<T, TetherError>;

/// Errors that can occur in TetherDB operations.
#[derive(Debug, Error)]
pub enum TetherError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Transport errors
    #[error("No memory-node channels configured")]
    NoChannels,

    #[error("Channel to memory node {memory_node} closed")]
    ChannelClosed { memory_node: u32 },

    #[error("Completion stream closed with {outstanding} requests in flight")]
    CompletionStreamClosed { outstanding: usize },

    // Address errors
    #[error("Address {addr:#x} outside any memory-node slab")]
    AddressOutOfRange { addr: u64 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: TetherError = io_err.into();
        assert!(matches!(err, TetherError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_channel_closed_display() {
        let err = TetherError::ChannelClosed { memory_node: 3 };
        assert_eq!(err.to_string(), "Channel to memory node 3 closed");
    }

    #[test]
    fn test_completion_stream_closed_display() {
        let err = TetherError::CompletionStreamClosed { outstanding: 7 };
        assert_eq!(
            err.to_string(),
            "Completion stream closed with 7 requests in flight"
        );
    }

    #[test]
    fn test_address_out_of_range_display() {
        let err = TetherError::AddressOutOfRange { addr: 0xdead_beef };
        assert_eq!(
            err.to_string(),
            "Address 0xdeadbeef outside any memory-node slab"
        );
    }

    #[test]
    fn test_config_errors_display() {
        let err = TetherError::ConfigError("missing num_memory_nodes".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing num_memory_nodes"
        );

        let err = TetherError::InvalidParameter {
            name: "btree_fanout".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid parameter: btree_fanout = 0");
    }

    #[test]
    fn test_internal_error_display() {
        let err = TetherError::Internal("assertion failed".to_string());
        assert_eq!(err.to_string(), "Internal error: assertion failed");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(TetherError::NoChannels)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TetherError>();
    }
}
