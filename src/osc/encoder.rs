//! # OSC Message Encoder
//!
//! Encodes single-float OSC messages.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::*;
use crate::error::{BridgeError, Result};

/// Encode an address and float value into an OSC message
///
/// # Arguments
///
/// * `address` - OSC address (e.g. `/input/Vertical`)
/// * `value` - Float32 argument
///
/// # Returns
///
/// * `Result<Bytes>` - Encoded message: padded address, padded `,f` type tag,
///   big-endian float
///
/// # Errors
///
/// Returns error if the address is invalid or the message would exceed
/// [`OSC_MAX_MESSAGE_SIZE`]
///
/// # Examples
///
/// ```
/// use locomotion_bridge::osc::encoder::encode_float_message;
///
/// let msg = encode_float_message("/input/Vertical", 1.0)?;
/// assert_eq!(msg.len(), 24);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn encode_float_message(address: &str, value: f32) -> Result<Bytes> {
    validate_address(address)?;

    let size = padded_len(address.len()) + padded_len(OSC_TYPE_TAG_FLOAT.len()) + OSC_FLOAT_SIZE;
    if size > OSC_MAX_MESSAGE_SIZE {
        return Err(BridgeError::Osc(format!(
            "Message size {} exceeds maximum {}",
            size, OSC_MAX_MESSAGE_SIZE
        )));
    }

    let mut buf = BytesMut::with_capacity(size);
    put_padded_str(&mut buf, address);
    put_padded_str(&mut buf, OSC_TYPE_TAG_FLOAT);
    buf.put_f32(value); // OSC is big-endian

    Ok(buf.freeze())
}

/// Write a NUL-terminated string padded to the OSC alignment
fn put_padded_str(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_bytes(0, padded_len(s.len()) - s.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_vertical_layout() {
        let msg = encode_float_message(ADDRESS_VERTICAL, 1.0).unwrap();

        // "/input/Vertical" is 15 bytes -> 16 with NUL, ",f" -> 4, float -> 4
        assert_eq!(msg.len(), 24);
        assert_eq!(&msg[..15], b"/input/Vertical");
        assert_eq!(msg[15], 0);
        assert_eq!(&msg[16..20], b",f\0\0");
        assert_eq!(&msg[20..], &[0x3F, 0x80, 0x00, 0x00]); // 1.0f32 big-endian
    }

    #[test]
    fn test_encode_horizontal_layout() {
        let msg = encode_float_message(ADDRESS_HORIZONTAL, -0.5).unwrap();

        // "/input/Horizontal" is 17 bytes -> 20 with NUL and padding
        assert_eq!(msg.len(), 28);
        assert_eq!(&msg[17..20], &[0, 0, 0]);
        assert_eq!(&msg[20..24], b",f\0\0");
        assert_eq!(&msg[24..], &(-0.5f32).to_be_bytes());
    }

    #[test]
    fn test_encode_zero() {
        let msg = encode_float_message(ADDRESS_VERTICAL, 0.0).unwrap();
        assert_eq!(&msg[20..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_encoded_length_is_aligned() {
        for address in ["/a", "/ab", "/abc", "/abcd", "/input/Vertical"] {
            let msg = encode_float_message(address, 0.25).unwrap();
            assert_eq!(msg.len() % OSC_ALIGNMENT, 0, "address {}", address);
        }
    }

    #[test]
    fn test_encode_rejects_invalid_address() {
        assert!(encode_float_message("input/Vertical", 1.0).is_err());
    }

    #[test]
    fn test_encode_rejects_oversized_message() {
        let address = format!("/{}", "a".repeat(OSC_MAX_MESSAGE_SIZE));
        assert!(matches!(
            encode_float_message(&address, 1.0),
            Err(BridgeError::Osc(_))
        ));
    }
}
