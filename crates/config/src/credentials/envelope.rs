//! The on-disk credentials envelope.
//!
//! A credentials file holds three base64 fields separated by `--`:
//! ciphertext, IV, and authentication tag.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::cipher::DecryptError;
use crate::constants::ENVELOPE_SEPARATOR;

/// Decoded fields of one credentials file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

impl Envelope {
    /// Parses the `ciphertext--iv--tag` text form.
    ///
    /// Surrounding whitespace (a trailing newline, typically) is ignored.
    pub fn parse(text: &str) -> Result<Self, DecryptError> {
        let parts: Vec<&str> = text.trim().split(ENVELOPE_SEPARATOR).collect();
        let [ciphertext, iv, auth_tag] = parts.as_slice() else {
            return Err(DecryptError::MalformedEnvelope(format!(
                "expected 3 fields separated by `{}`, found {}",
                ENVELOPE_SEPARATOR,
                parts.len()
            )));
        };

        Ok(Self {
            ciphertext: decode_field("ciphertext", ciphertext)?,
            iv: decode_field("iv", iv)?,
            auth_tag: decode_field("auth tag", auth_tag)?,
        })
    }
}

fn decode_field(name: &str, field: &str) -> Result<Vec<u8>, DecryptError> {
    STANDARD
        .decode(field)
        .map_err(|e| DecryptError::MalformedEnvelope(format!("{} is not valid base64: {}", name, e)))
}

impl FromStr for Envelope {
    type Err = DecryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(&self.iv),
            STANDARD.encode(&self.auth_tag),
            sep = ENVELOPE_SEPARATOR
        )
    }
}
