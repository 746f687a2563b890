//! # OSC Message Decoder
//!
//! Decodes single-float OSC messages, used to verify what the bridge puts on
//! the wire.

use super::protocol::*;
use crate::error::{BridgeError, Result};

/// Decode a complete single-float OSC message
///
/// # Errors
///
/// Returns error if:
/// - Message length is not a multiple of 4
/// - A string field is unterminated or not valid UTF-8
/// - The type tag is anything other than `,f`
/// - The float argument is missing or followed by trailing bytes
pub fn decode_message(data: &[u8]) -> Result<OscMessage> {
    if data.len() % OSC_ALIGNMENT != 0 {
        return Err(BridgeError::Osc(format!(
            "Message length {} is not 4-byte aligned",
            data.len()
        )));
    }

    let (address, offset) = read_padded_str(data, 0)?;

    let (type_tag, offset) = read_padded_str(data, offset)?;
    if type_tag != OSC_TYPE_TAG_FLOAT {
        return Err(BridgeError::Osc(format!("Unsupported type tag: {:?}", type_tag)));
    }

    let rest = &data[offset..];
    if rest.len() != OSC_FLOAT_SIZE {
        return Err(BridgeError::Osc(format!(
            "Expected {} argument bytes, got {}",
            OSC_FLOAT_SIZE,
            rest.len()
        )));
    }
    let value = f32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);

    OscMessage::new(address, value)
}

/// Read a padded string starting at `offset`, returning it and the next offset
fn read_padded_str(data: &[u8], offset: usize) -> Result<(&str, usize)> {
    let field = data.get(offset..).unwrap_or_default();
    let nul = field
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| BridgeError::Osc("Unterminated string".to_string()))?;

    let s = std::str::from_utf8(&field[..nul])
        .map_err(|e| BridgeError::Osc(format!("Invalid UTF-8 in string: {}", e)))?;

    let next = offset + padded_len(nul);
    if next > data.len() {
        return Err(BridgeError::Osc("String padding runs past end of message".to_string()));
    }

    Ok((s, next))
}
