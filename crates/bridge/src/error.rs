//! Error types for the padlink bridge

use std::path::PathBuf;

use padlink_hid_common::HidCommonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No supported controller found")]
    NoDevice,

    #[error("Found {0} supported controllers, want exactly 1")]
    MultipleDevices(usize),

    #[error("USB enumeration failed: {0}")]
    Enumeration(String),

    #[error("Failed to open controller: {0}")]
    Open(String),

    #[error("Initialization handshake failed: {0}")]
    Handshake(HidCommonError),

    #[error("Event sink {path} unavailable (is the key server running?): {source}")]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Controller disconnected: {0}")]
    Disconnected(HidCommonError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl BridgeError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BridgeError::NoDevice
            | BridgeError::MultipleDevices(_)
            | BridgeError::Enumeration(_) => 2,
            BridgeError::InvalidConfiguration(_) | BridgeError::YamlError(_) => 3,
            BridgeError::Open(_) | BridgeError::Handshake(_) => 4,
            BridgeError::SinkUnavailable { .. } => 5,
            BridgeError::Disconnected(_) | BridgeError::IoError(_) => 1,
        }
    }
}
