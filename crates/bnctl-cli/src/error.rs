//! Error types for bnctl CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use bnctl_core::error::CoreError;
use thiserror::Error;

pub use bnctl_core::error::{ConfigError, DeviceError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const AUTH_ERROR: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Device(DeviceError::Timeout { .. }) => exit_codes::NETWORK_ERROR,
                CoreError::Device(_) => exit_codes::DEVICE_ERROR,
                CoreError::Config(ConfigError::AuthFailure { .. }) => exit_codes::AUTH_ERROR,
                CoreError::Config(ConfigError::Http { .. }) => exit_codes::NETWORK_ERROR,
                CoreError::Config(ConfigError::UnknownKey(_))
                | CoreError::Config(ConfigError::Validation { .. }) => exit_codes::INVALID_ARGS,
                CoreError::Config(_) => exit_codes::DEVICE_ERROR,
                CoreError::Frame(_) => exit_codes::DEVICE_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
        }
    }
}

impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::Core(CoreError::Device(e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Core(CoreError::Config(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let auth = CliError::from(ConfigError::AuthFailure {
            ip: "192.168.0.2".to_string(),
        });
        assert_eq!(auth.exit_code(), exit_codes::AUTH_ERROR);

        let timeout = CliError::from(DeviceError::Timeout {
            device: "192.168.0.2".to_string(),
            operation: "ping".to_string(),
        });
        assert_eq!(timeout.exit_code(), exit_codes::NETWORK_ERROR);

        let unknown = CliError::from(ConfigError::UnknownKey("foo".to_string()));
        assert_eq!(unknown.exit_code(), exit_codes::INVALID_ARGS);

        assert_eq!(
            CliError::from(DeviceError::NotInFlashMode("x".to_string())).exit_code(),
            exit_codes::DEVICE_ERROR
        );
    }
}
