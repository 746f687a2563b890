//! # OSC Protocol Constants and Types
//!
//! Core protocol definitions for the OSC 1.0 messages sent by the bridge.

use crate::error::{BridgeError, Result};

/// Every OSC field is padded to a multiple of 4 bytes
pub const OSC_ALIGNMENT: usize = 4;

/// Type tag string for a message with a single float32 argument
pub const OSC_TYPE_TAG_FLOAT: &str = ",f";

/// Size of a float32 argument
pub const OSC_FLOAT_SIZE: usize = 4;

/// Maximum encoded message size the bridge produces or accepts
pub const OSC_MAX_MESSAGE_SIZE: usize = 512;

/// Forward/backward locomotion input (stick Y)
pub const ADDRESS_VERTICAL: &str = "/input/Vertical";

/// Strafe locomotion input (stick X)
pub const ADDRESS_HORIZONTAL: &str = "/input/Horizontal";

/// A single-float OSC message
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    /// Address pattern, always starting with `/`
    pub address: String,

    /// Float32 argument
    pub value: f32,
}

impl OscMessage {
    /// Create a new OSC message
    ///
    /// # Errors
    ///
    /// Returns error if the address is not a valid OSC address
    pub fn new(address: &str, value: f32) -> Result<Self> {
        validate_address(address)?;
        Ok(Self {
            address: address.to_string(),
            value,
        })
    }
}

/// Length of a string field once NUL-terminated and padded
pub fn padded_len(len: usize) -> usize {
    (len + 1).div_ceil(OSC_ALIGNMENT) * OSC_ALIGNMENT
}

/// Check that `address` is a usable OSC address
///
/// Must start with `/` and contain no NUL, whitespace or pattern characters.
pub fn validate_address(address: &str) -> Result<()> {
    if !address.starts_with('/') {
        return Err(BridgeError::Osc(format!(
            "Address must start with '/': {:?}",
            address
        )));
    }

    if let Some(c) = address
        .chars()
        .find(|c| *c == '\0' || c.is_whitespace() || "#*,?[]{}".contains(*c))
    {
        return Err(BridgeError::Osc(format!(
            "Invalid character {:?} in address {:?}",
            c, address
        )));
    }

    Ok(())
}
