//! Value objects shared across the envelope pipeline.
//!
//! Everything here is a plain owned value: identities and readings are
//! immutable once constructed, key material is zeroed on drop, and none of
//! these types borrow from transport buffers.

use std::fmt;

use thiserror::Error;

use crate::packet::SEPARATOR;

/// Byte length of the shared AES-128 key.
pub const KEY_LEN: usize = 16;

/// Byte length of a CBC initialisation vector (one cipher block).
pub const IV_LEN: usize = 16;

/// Longest accepted device identity, in bytes.
///
/// Bounds the identity segment [`crate::packet::decode`] will accept from
/// decrypted bytes, so a wrong-key decrypt cannot yield an arbitrarily
/// large "identity".
pub const MAX_IDENTITY_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Errors produced when validating a device identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity is the empty string.
    #[error("device identity is empty")]
    Empty,

    /// The identity contains the packet separator character.
    #[error("device identity contains '{SEPARATOR}'")]
    ContainsSeparator,

    /// The identity contains non-ASCII characters.
    #[error("device identity is not ASCII")]
    NotAscii,

    /// The identity exceeds [`MAX_IDENTITY_LEN`] bytes.
    #[error("device identity is {0} bytes, limit is {MAX_IDENTITY_LEN}")]
    TooLong(usize),
}

/// Validated sensor identity, e.g. `"ESP-01"`.
///
/// Construction enforces the canonical-packet constraints: non-empty,
/// ASCII, free of the separator character, at most [`MAX_IDENTITY_LEN`]
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Validate and wrap a device identity.
    ///
    /// # Errors
    ///
    /// Returns the [`IdentityError`] for the first violated constraint.
    pub fn new(identity: impl Into<String>) -> Result<Self, IdentityError> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(IdentityError::Empty);
        }
        if !identity.is_ascii() {
            return Err(IdentityError::NotAscii);
        }
        if identity.contains(SEPARATOR) {
            return Err(IdentityError::ContainsSeparator);
        }
        if identity.len() > MAX_IDENTITY_LEN {
            return Err(IdentityError::TooLong(identity.len()));
        }
        Ok(Self(identity))
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Readings and accepted ranges
// ---------------------------------------------------------------------------

/// A sensor reading with exactly one fractional decimal digit.
///
/// Stored as a signed count of tenths so that values survive the
/// encode/decode round trip exactly; `from_tenths(243)` is `24.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScalarReading(i32);

impl ScalarReading {
    /// Build a reading from a count of tenths.
    pub const fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    /// The reading as a count of tenths.
    pub const fn tenths(self) -> i32 {
        self.0
    }

    /// Convert a float to the nearest representable reading.
    ///
    /// Returns `None` for non-finite inputs and values whose tenths count
    /// does not fit an `i32`.
    pub fn from_f64(value: f64) -> Option<Self> {
        let tenths = (value * 10.0).round();
        if !tenths.is_finite() || tenths < i32::MIN as f64 || tenths > i32::MAX as f64 {
            return None;
        }
        Some(Self(tenths as i32))
    }

    /// The reading as a float, for JSON payloads and storage.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for ScalarReading {
    /// Canonical rendering: optional sign, integer part, `.`, one digit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 10;
        let tenth = (self.0 % 10).abs();
        if self.0 < 0 && whole == 0 {
            write!(f, "-0.{tenth}")
        } else {
            write!(f, "{whole}.{tenth}")
        }
    }
}

/// Error constructing an [`AcceptedRange`] whose minimum exceeds its maximum.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid accepted range: minimum {min} exceeds maximum {max}")]
pub struct RangeError {
    /// Offending lower bound.
    pub min: ScalarReading,
    /// Offending upper bound.
    pub max: ScalarReading,
}

/// Inclusive range of plausible readings, enforced after decryption.
///
/// Decrypting under a wrong key can yield bytes that still parse as a
/// packet; the range check is the last line of defence against storing
/// such garbage as a real reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedRange {
    min: ScalarReading,
    max: ScalarReading,
}

impl AcceptedRange {
    /// Build a range from inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] if `min > max`.
    pub fn new(min: ScalarReading, max: ScalarReading) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError { min, max });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    pub const fn min(&self) -> ScalarReading {
        self.min
    }

    /// Inclusive upper bound.
    pub const fn max(&self) -> ScalarReading {
        self.max
    }

    /// Whether `value` lies within the range.
    pub fn contains(&self, value: ScalarReading) -> bool {
        self.min <= value && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// Key material
// ---------------------------------------------------------------------------

/// Errors produced when parsing key material from its hex form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyMaterialError {
    /// The string is not valid hex.
    #[error("invalid hex encoding")]
    InvalidHex,

    /// The decoded bytes have the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte count.
        expected: usize,
        /// Byte count actually decoded.
        actual: usize,
    },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], KeyMaterialError> {
    let bytes = hex::decode(s).map_err(|_| KeyMaterialError::InvalidHex)?;
    let actual = bytes.len();
    <[u8; N]>::try_from(bytes).map_err(|_| KeyMaterialError::InvalidLength {
        expected: N,
        actual,
    })
}

/// Shared 128-bit encryption key.
///
/// The buffer is overwritten with zeroes on drop and `Debug` output is
/// redacted, so the key cannot leak through logs or panic dumps.
#[derive(Clone)]
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Parse a key from its 32-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError`] on malformed hex or a wrong length.
    pub fn from_hex(s: &str) -> Result<Self, KeyMaterialError> {
        Ok(Self(Box::new(decode_fixed::<KEY_LEN>(s)?)))
    }

    /// Raw key bytes, for the cipher layer.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("Key([REDACTED])")
    }
}

/// CBC initialisation vector, one cipher block wide.
///
/// Not secret, but it must be fresh per message under a given key for the
/// first ciphertext block to be unpredictable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Wrap raw IV bytes.
    pub const fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an IV from its 32-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError`] on malformed hex or a wrong length.
    pub fn from_hex(s: &str) -> Result<Self, KeyMaterialError> {
        Ok(Self(decode_fixed::<IV_LEN>(s)?))
    }

    /// Raw IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }

    /// Lowercase hex rendering for the wire.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Sealed ciphertext as produced by the sensor side.
///
/// Construction does not enforce block alignment; the cipher layer rejects
/// misaligned input, so a transport-mangled envelope surfaces as a typed
/// error instead of a construction panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope(Vec<u8>);

impl Envelope {
    /// Wrap raw ciphertext bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Ciphertext bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the envelope, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Ciphertext length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the envelope holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering for the wire.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}
