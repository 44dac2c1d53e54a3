//! Endpoint I/O abstractions for padlink device backends
//!
//! The protocol crates never touch USB directly. A backend opens the device
//! and hands the session a pair of endpoints implementing [`InputEndpoint`]
//! and [`OutputEndpoint`]; tests use the in-memory [`mock`] pair instead.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod endpoint;

pub use device_info::*;
pub use endpoint::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Read timed out after {0:?}")]
    Timeout(Duration),

    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Device disconnected")]
    Disconnected,
}

impl HidCommonError {
    /// Errors after which the next read may well succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HidCommonError::Timeout(_) | HidCommonError::ReadError(_)
        )
    }
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = HidCommonError::Timeout(Duration::from_millis(250));
        assert_eq!(format!("{}", err), "Read timed out after 250ms");

        let err = HidCommonError::Disconnected;
        assert_eq!(format!("{}", err), "Device disconnected");

        let err = HidCommonError::ShortWrite {
            written: 1,
            expected: 2,
        };
        assert_eq!(format!("{}", err), "Short write: sent 1 of 2 bytes");
    }

    #[test]
    fn test_package_metadata() {
        assert_eq!(env!("CARGO_PKG_NAME"), "padlink-hid-common");
        assert!(env!("CARGO_PKG_DESCRIPTION").contains("endpoint"));
        assert!(!env!("CARGO_PKG_LICENSE").is_empty());
    }

    #[test]
    fn test_transient_classification() {
        assert!(HidCommonError::Timeout(Duration::from_secs(60)).is_transient());
        assert!(HidCommonError::ReadError("pipe".to_string()).is_transient());
        assert!(!HidCommonError::Disconnected.is_transient());
        assert!(!HidCommonError::WriteError("stall".to_string()).is_transient());
    }
}
