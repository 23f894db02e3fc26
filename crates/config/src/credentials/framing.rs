//! Length-prefixed string framing inside decrypted credentials.
//!
//! The plaintext of a credentials file is one serialized string object. Only
//! that single shape is understood here; this is not a general deserializer.
//!
//! Layout as read:
//! - everything up to and including the first `"` byte is type metadata;
//! - one pointer byte follows. A pointer of 1..=3 is the count of
//!   little-endian length bytes that come next; any other pointer is the
//!   length itself (0 meaning empty);
//! - `length` payload bytes follow; anything after them is ignored.

use super::cipher::DecryptError;

const STRING_MARKER: u8 = b'"';

/// Type metadata written ahead of the string marker.
const HEADER: &[u8] = b"\x04\x08I";

/// Encoding metadata written after the payload (UTF-8 flag).
const TRAILER: &[u8] = b"\x06:\x06ET";

/// Largest payload representable with three length bytes.
pub(crate) const MAX_FRAMED_LEN: usize = (1 << 24) - 1;

/// Recovers the embedded text from a decrypted payload.
///
/// Missing length bytes count as zero and a payload shorter than its declared
/// length is returned as far as it goes.
///
/// # Errors
///
/// Returns `DecryptError::MalformedPayload` when there is no string marker or
/// the payload is not UTF-8.
pub fn decode_framed_string(bytes: &[u8]) -> Result<String, DecryptError> {
    let marker = bytes
        .iter()
        .position(|&b| b == STRING_MARKER)
        .ok_or_else(|| DecryptError::MalformedPayload("no string marker found".to_string()))?;
    let mut rest = bytes[marker + 1..].iter().copied();

    let Some(pointer) = rest.next() else {
        return Ok(String::new());
    };

    let length = if (1..=3).contains(&pointer) {
        (0..usize::from(pointer)).fold(0usize, |length, i| {
            length | (usize::from(rest.next().unwrap_or(0)) << (8 * i))
        })
    } else {
        usize::from(pointer)
    };

    let payload: Vec<u8> = rest.take(length).collect();
    String::from_utf8(payload).map_err(|e| DecryptError::MalformedPayload(e.to_string()))
}

/// Frames `text` so that [`decode_framed_string`] recovers it.
///
/// The length is always written in explicit-count form, which is also how
/// the originating serializer reads it back.
pub fn encode_framed_string(text: &str) -> Result<Vec<u8>, DecryptError> {
    let payload = text.as_bytes();
    if payload.len() > MAX_FRAMED_LEN {
        return Err(DecryptError::PayloadTooLarge(payload.len()));
    }

    let length_bytes = payload.len().to_le_bytes();
    let count = length_bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(1, |last| last + 1);

    let mut framed = Vec::with_capacity(HEADER.len() + 5 + payload.len() + TRAILER.len());
    framed.extend_from_slice(HEADER);
    framed.push(STRING_MARKER);
    framed.push(count as u8);
    framed.extend_from_slice(&length_bytes[..count]);
    framed.extend_from_slice(payload);
    framed.extend_from_slice(TRAILER);
    Ok(framed)
}
