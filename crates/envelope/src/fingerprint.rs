//! Content fingerprints of canonical packets.
//!
//! The digest is computed over the exact plaintext packet bytes, before
//! padding and encryption, so sender and collector derive the same value
//! independently of transport details. The collector stores it for later
//! anchoring to an external ledger.

use std::fmt;

use sha2::{Digest, Sha256};

/// Byte length of a fingerprint digest (SHA-256).
pub const FINGERPRINT_LEN: usize = 32;

/// SHA-256 digest of a canonical packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Full lowercase hex rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fingerprint a byte string.
pub fn digest(bytes: &[u8]) -> Fingerprint {
    Fingerprint(Sha256::digest(bytes).into())
}
