//! Error types for bnctl core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A received or constructed GBL4 frame that does not follow the wire rules.
///
/// Frames failing these checks are discarded by the transport; they only
/// reach a caller when decoding is invoked directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Frame too short: {len} bytes")]
    TooShort { len: usize },

    #[error("Bad frame prefix")]
    BadMagic,

    #[error("Unknown command code {0}")]
    UnknownCommand(u8),

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Payload of {len} bytes exceeds maximum of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Truncated {what} payload: {len} of {need} bytes")]
    Truncated {
        what: &'static str,
        len: usize,
        need: usize,
    },
}

/// Errors from UDP management operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Transport not initialized")]
    NotInitialized,

    #[error("No {operation} reply from {device}")]
    Timeout { device: String, operation: String },

    #[error("{operation} rejected by {device}: error code {code}")]
    Rejected {
        device: String,
        operation: String,
        code: u8,
    },

    #[error("Malformed reply from {device}: {source}")]
    Malformed {
        device: String,
        #[source]
        source: FrameError,
    },

    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("Device {0} is not in flash mode")]
    NotInFlashMode(String),

    #[error("Flashing {device} aborted at page {page} of {total}")]
    FlashAborted {
        device: String,
        page: u16,
        total: u16,
    },

    #[error("Invalid firmware image: {0}")]
    InvalidFirmware(String),
}

/// Errors from the key-mapping codec and the HTTP configuration channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {message}")]
    Validation { key: String, message: String },

    #[error("Invalid username/password for {ip}")]
    AuthFailure { ip: String },

    #[error("Command failed on {ip}: HTTP {status}")]
    CommandFailed { ip: String, status: u16 },

    #[error("Configuration version {found} does not match expected {expected}, values may be incorrect")]
    VersionMismatch { expected: String, found: String },

    #[error("No valid configuration found on {ip}")]
    NoConfiguration { ip: String },

    #[error("HTTP request to {ip} failed: {message}")]
    Http { ip: String, message: String },
}

impl ConfigError {
    pub(crate) fn validation(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
