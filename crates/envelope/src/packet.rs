//! Canonical packet codec.
//!
//! A canonical packet is the exact plaintext form of one reading:
//!
//! ```text
//! <identity>:<value>
//! ```
//!
//! rendered as ASCII with exactly one fractional digit, e.g.
//! `ESP-01:24.3`. These bytes are what gets padded, encrypted and
//! fingerprinted, so any deviation in rendering would change the
//! fingerprint. Both directions live here and nowhere else.

use thiserror::Error;

use crate::types::{DeviceId, IdentityError, ScalarReading};

/// Separator between the identity and value segments.
pub const SEPARATOR: char = ':';

/// Errors produced when encoding a packet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The identity violates the [`DeviceId`] constraints.
    #[error("invalid device identity: {0}")]
    Identity(#[from] IdentityError),
}

/// Errors produced when decoding a packet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodingError {
    /// The bytes are not ASCII text.
    #[error("packet is not ASCII")]
    NotAscii,

    /// No separator between identity and value.
    #[error("packet has no '{SEPARATOR}' separator")]
    MissingSeparator,

    /// The identity segment violates the [`DeviceId`] constraints.
    #[error("invalid device identity in packet: {0}")]
    Identity(#[from] IdentityError),

    /// The value segment is not a canonical one-fractional-digit decimal.
    #[error("malformed value segment {0:?}")]
    MalformedValue(String),
}

/// Encode one reading into its canonical packet bytes.
///
/// # Errors
///
/// Returns [`EncodingError::Identity`] if `identity` is empty, non-ASCII,
/// contains the separator, or is too long.
pub fn encode(identity: &str, value: ScalarReading) -> Result<Vec<u8>, EncodingError> {
    let identity = DeviceId::new(identity)?;
    Ok(format!("{identity}{SEPARATOR}{value}").into_bytes())
}

/// Decode canonical packet bytes back into identity and value.
///
/// Splitting happens at the first separator, and only the canonical value
/// rendering is accepted: optional minus, no redundant leading zeroes,
/// exactly one fractional digit. Decrypted garbage that merely resembles
/// a number is rejected here rather than stored.
///
/// # Errors
///
/// Returns a [`DecodingError`] naming the first malformed segment.
pub fn decode(bytes: &[u8]) -> Result<(DeviceId, ScalarReading), DecodingError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodingError::NotAscii)?;
    if !text.is_ascii() {
        return Err(DecodingError::NotAscii);
    }
    let (identity, value) = text
        .split_once(SEPARATOR)
        .ok_or(DecodingError::MissingSeparator)?;
    let identity = DeviceId::new(identity)?;
    let value =
        parse_value(value).ok_or_else(|| DecodingError::MalformedValue(value.to_owned()))?;
    Ok((identity, value))
}

/// Parse the canonical value rendering: `-?(0|[1-9][0-9]*)\.[0-9]`,
/// excluding `-0.0`.
fn parse_value(s: &str) -> Option<ScalarReading> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.')?;
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if whole.len() > 1 && whole.starts_with('0') {
        return None;
    }
    let frac_digit = match frac.as_bytes() {
        [d] if d.is_ascii_digit() => d - b'0',
        _ => return None,
    };

    let whole: i64 = whole.parse().ok()?;
    let tenths = whole.checked_mul(10)?.checked_add(i64::from(frac_digit))?;
    if negative && tenths == 0 {
        return None;
    }
    let tenths = if negative { -tenths } else { tenths };
    i32::try_from(tenths).ok().map(ScalarReading::from_tenths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tenths: i32) -> ScalarReading {
        ScalarReading::from_tenths(tenths)
    }

    #[test]
    fn encode_renders_canonical_form() {
        assert_eq!(encode("ESP-01", reading(243)).unwrap(), b"ESP-01:24.3");
        assert_eq!(encode("ESP-01", reading(0)).unwrap(), b"ESP-01:0.0");
        assert_eq!(encode("ESP-01", reading(-7)).unwrap(), b"ESP-01:-0.7");
        assert_eq!(encode("ESP-01", reading(1500)).unwrap(), b"ESP-01:150.0");
    }

    #[test]
    fn encode_rejects_invalid_identity() {
        assert!(matches!(
            encode("", reading(1)),
            Err(EncodingError::Identity(IdentityError::Empty))
        ));
        assert!(matches!(
            encode("a:b", reading(1)),
            Err(EncodingError::Identity(IdentityError::ContainsSeparator))
        ));
        assert!(matches!(
            encode("ESP-Ø1", reading(1)),
            Err(EncodingError::Identity(IdentityError::NotAscii))
        ));
    }

    #[test]
    fn decode_round_trips_encode() {
        let cases = [
            ("ESP-01", 243),
            ("ESP-STATION-22", 1284),
            ("a", 0),
            ("ESP-01", -123),
            ("ESP-01", i32::MAX),
            ("ESP-01", i32::MIN),
        ];
        for (identity, tenths) in cases {
            let packet = encode(identity, reading(tenths)).unwrap();
            let (decoded_id, decoded_value) = decode(&packet).unwrap();
            assert_eq!(decoded_id.as_str(), identity);
            assert_eq!(decoded_value, reading(tenths));
        }
    }

    #[test]
    fn decode_rejects_missing_separator() {
        assert_eq!(decode(b"ESP-01 24.3"), Err(DecodingError::MissingSeparator));
    }

    #[test]
    fn decode_rejects_empty_identity() {
        assert!(matches!(
            decode(b":24.3"),
            Err(DecodingError::Identity(IdentityError::Empty))
        ));
    }

    #[test]
    fn decode_rejects_non_ascii_bytes() {
        assert_eq!(decode(&[0xff, 0xfe, b':', b'1', b'.', b'0']), Err(DecodingError::NotAscii));
        assert_eq!(decode("ESP-Ø1:24.3".as_bytes()), Err(DecodingError::NotAscii));
    }

    #[test]
    fn decode_rejects_malformed_values() {
        let malformed = [
            "ESP-01:",
            "ESP-01:24",
            "ESP-01:24.",
            "ESP-01:24.35",
            "ESP-01:2 4.3",
            "ESP-01:+24.3",
            "ESP-01:04.3",
            "ESP-01:-0.0",
            "ESP-01:1e3",
            "ESP-01:inf",
            "ESP-01:24.3x",
            "ESP-01:--1.0",
            "ESP-01:.3",
        ];
        for input in malformed {
            assert!(
                matches!(decode(input.as_bytes()), Err(DecodingError::MalformedValue(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn decode_rejects_tenths_overflow() {
        // 300000000.0 is 3e9 tenths, past i32::MAX.
        assert!(matches!(
            decode(b"ESP-01:300000000.0"),
            Err(DecodingError::MalformedValue(_))
        ));
    }

    #[test]
    fn decode_splits_at_first_separator() {
        // The value segment then fails to parse; identities cannot contain
        // the separator, so such bytes never come from encode.
        assert!(matches!(
            decode(b"a:b:1.5"),
            Err(DecodingError::MalformedValue(_))
        ));
    }
}
