//! # Error Types
//!
//! Custom error types for Locomotion Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Locomotion Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// OSC protocol errors
    #[error("OSC protocol error: {0}")]
    Osc(String),

    /// Configuration parse errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Device provider could not be started
    #[error("Device provider error: {0}")]
    Provider(String),

    /// Signal sink errors
    #[error("Signal sink error: {0}")]
    Sink(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Locomotion Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
