//! Hex command decoding
//!
//! A hex command is a run of byte pairs such as `41 42`, `0x41 0x42` or
//! `4142`. Spaces and every literal `0x` are stripped first, then the
//! remaining characters are read two at a time from the start.

use super::mode::Mode;
use std::fmt;
use thiserror::Error;

/// A hex group that could not be decoded
///
/// `position` is the character offset of the group in the cleaned command
/// (after spaces and `0x` prefixes are removed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex input '{group}' at position {position}")]
pub struct InvalidHexInput {
    pub group: String,
    pub position: usize,
}

/// Bytes ready to be handed to a transmit sink
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Render each byte as the character with that code point (Latin-1)
    pub fn to_char_string(&self) -> String {
        self.0.iter().map(|&b| char::from(b)).collect()
    }

    /// Space separated lowercase hex listing, e.g. `41 42 0d`
    pub fn to_hex_string(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_char_string())
    }
}

/// Decode a trimmed, non-empty command according to `mode`
pub fn decode(command: &str, mode: Mode) -> Result<Payload, InvalidHexInput> {
    match mode {
        Mode::Text => Ok(Payload::from(command)),
        Mode::Hex => decode_hex(command),
    }
}

/// Decode a hex command into bytes
///
/// A trailing unpaired digit is rejected rather than read as a lone nibble.
pub fn decode_hex(command: &str) -> Result<Payload, InvalidHexInput> {
    let cleaned = command.replace(' ', "").replace("0x", "");
    let chars: Vec<char> = cleaned.chars().collect();

    let mut bytes = Vec::with_capacity(chars.len() / 2);
    for (index, group) in chars.chunks(2).enumerate() {
        let position = index * 2;
        let byte = match group {
            [hi, lo] => hex_digit(*hi)
                .zip(hex_digit(*lo))
                .map(|(hi, lo)| (hi << 4) | lo),
            _ => None,
        };

        match byte {
            Some(b) => bytes.push(b),
            None => {
                return Err(InvalidHexInput {
                    group: group.iter().collect(),
                    position,
                })
            }
        }
    }

    log::debug!("Decoded {} hex chars into {} bytes", chars.len(), bytes.len());
    Ok(Payload(bytes))
}

fn hex_digit(c: char) -> Option<u8> {
    if c.is_ascii_hexdigit() {
        c.to_digit(16).map(|d| d as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_mode_is_verbatim() {
        for s in ["ping", "KISS ON", "0x41", "héllo wörld", "4g"] {
            let payload = decode(s, Mode::Text).unwrap();
            assert_eq!(payload.as_bytes(), s.as_bytes());
        }
    }

    #[test]
    fn test_hex_spaced_pairs() {
        let payload = decode(" 41 42 ", Mode::Hex).unwrap();
        assert_eq!(payload.as_bytes(), b"AB");
        assert_eq!(payload.to_char_string(), "AB");
    }

    #[test]
    fn test_hex_prefix_removed() {
        assert_eq!(decode("0x61", Mode::Hex).unwrap().to_char_string(), "a");
    }

    #[test]
    fn test_every_prefix_removed() {
        let payload = decode("0x480x69 0x21", Mode::Hex).unwrap();
        assert_eq!(payload.as_bytes(), b"Hi!");
    }

    #[test]
    fn test_uppercase_prefix_is_not_stripped() {
        let err = decode("0X61", Mode::Hex).unwrap_err();
        assert_eq!(err.group, "0X");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_even_length_halves() {
        let input = "c000aabbccddeeff10";
        let payload = decode_hex(input).unwrap();
        assert_eq!(payload.len(), input.len() / 2);
        assert_eq!(payload.as_bytes()[0], 0xc0);
        assert_eq!(payload.as_bytes()[8], 0x10);
    }

    #[test]
    fn test_high_bytes_map_to_latin1() {
        let payload = decode_hex("C0 DB").unwrap();
        assert_eq!(payload.as_bytes(), &[0xc0, 0xdb]);
        assert_eq!(payload.to_char_string(), "\u{c0}\u{db}");
    }

    #[test]
    fn test_invalid_group() {
        let err = decode("4g", Mode::Hex).unwrap_err();
        assert_eq!(
            err,
            InvalidHexInput {
                group: "4g".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_invalid_group_position_after_cleanup() {
        let err = decode_hex("0x41 0x42 zz").unwrap_err();
        assert_eq!(err.group, "zz");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_sign_is_not_a_digit() {
        let err = decode_hex("+1").unwrap_err();
        assert_eq!(err.group, "+1");
    }

    #[test]
    fn test_trailing_nibble_rejected() {
        let err = decode_hex("414").unwrap_err();
        assert_eq!(err.group, "4");
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_non_ascii_group() {
        let err = decode_hex("41é1").unwrap_err();
        assert_eq!(err.group, "é1");
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_hex_listing() {
        let payload = Payload::from("AB\r");
        assert_eq!(payload.to_hex_string(), "41 42 0d");
        assert_eq!(Payload::default().to_hex_string(), "");
    }
}
