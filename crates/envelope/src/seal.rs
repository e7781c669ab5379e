//! Sealing and unsealing of attestation envelopes.
//!
//! [`seal`] is the sensor-side composition: encode, pad, encrypt.
//! [`unseal`] is the collection-side inverse: decrypt, unpad, decode, then
//! fingerprint the recovered packet. Because the envelope itself is
//! unauthenticated, `unseal` also vets the decoded value against the
//! accepted range so wrong-key garbage cannot masquerade as a reading.

use thiserror::Error;

use crate::cipher::{self, AlignmentError, BLOCK_SIZE};
use crate::fingerprint::{self, Fingerprint};
use crate::packet::{self, DecodingError, EncodingError};
use crate::padding::{self, PaddingError};
use crate::types::{AcceptedRange, DeviceId, Envelope, Iv, Key, ScalarReading};

/// Decoded value failed the accepted-range check.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("value {value} outside accepted range [{min}, {max}]")]
pub struct AttestationError {
    /// The out-of-range decoded value.
    pub value: ScalarReading,
    /// Inclusive lower bound in force.
    pub min: ScalarReading,
    /// Inclusive upper bound in force.
    pub max: ScalarReading,
}

/// Errors produced while sealing a reading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SealError {
    /// Packet encoding rejected the identity.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The padded plaintext failed the block alignment check.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Errors produced while unsealing an envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnsealError {
    /// Ciphertext length is not a whole number of blocks.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Padding was corrupt after decryption (tampering or wrong key).
    #[error(transparent)]
    Padding(#[from] PaddingError),

    /// The recovered bytes are not a canonical packet.
    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// The packet decoded, but its value is implausible.
    #[error(transparent)]
    Attestation(#[from] AttestationError),
}

/// A successfully unsealed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsealed {
    /// Identity decoded from the packet, not the transport's claim.
    pub device_id: DeviceId,
    /// Decoded reading.
    pub value: ScalarReading,
    /// SHA-256 fingerprint of the canonical packet bytes.
    pub fingerprint: Fingerprint,
}

/// Seal one reading into a transmittable envelope.
///
/// # Errors
///
/// Propagates the first failing stage; in practice only identity
/// validation can fail, since padding always aligns the plaintext.
pub fn seal(
    identity: &str,
    value: ScalarReading,
    key: &Key,
    iv: &Iv,
) -> Result<Envelope, SealError> {
    let packet = packet::encode(identity, value)?;
    let padded = padding::pad(&packet, BLOCK_SIZE);
    let ciphertext = cipher::encrypt(&padded, key, iv)?;
    Ok(Envelope::from_bytes(ciphertext))
}

/// Unseal an envelope and fingerprint the recovered packet.
///
/// # Errors
///
/// Propagates the first failing stage, and returns
/// [`UnsealError::Attestation`] when the decoded value falls outside
/// `accepted`.
pub fn unseal(
    envelope: &Envelope,
    key: &Key,
    iv: &Iv,
    accepted: AcceptedRange,
) -> Result<Unsealed, UnsealError> {
    let padded = cipher::decrypt(envelope.as_bytes(), key, iv)?;
    let packet = padding::unpad(&padded, BLOCK_SIZE)?;
    let (device_id, value) = packet::decode(&packet)?;
    if !accepted.contains(value) {
        return Err(AttestationError {
            value,
            min: accepted.min(),
            max: accepted.max(),
        }
        .into());
    }
    let fingerprint = fingerprint::digest(&packet);
    Ok(Unsealed {
        device_id,
        value,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key() -> Key {
        Key::from_hex("2b7e151628aed2a6abf7158809cf4f3c").unwrap()
    }

    fn fixed_iv() -> Iv {
        Iv::from_hex("000102030405060708090a0b0c0d0e0f").unwrap()
    }

    fn wide_range() -> AcceptedRange {
        AcceptedRange::new(
            ScalarReading::from_tenths(-2_000_000),
            ScalarReading::from_tenths(2_000_000),
        )
        .unwrap()
    }

    fn demo_range() -> AcceptedRange {
        AcceptedRange::new(
            ScalarReading::from_tenths(150),
            ScalarReading::from_tenths(350),
        )
        .unwrap()
    }

    #[test]
    fn round_trip_recovers_reading() {
        let cases = [("ESP-01", 243), ("ESP-STATION-22", 1284), ("a", 0)];
        for (identity, tenths) in cases {
            let value = ScalarReading::from_tenths(tenths);
            let envelope = seal(identity, value, &fixed_key(), &fixed_iv()).unwrap();
            let unsealed = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range()).unwrap();
            assert_eq!(unsealed.device_id.as_str(), identity);
            assert_eq!(unsealed.value, value);
            let packet = packet::encode(identity, value).unwrap();
            assert_eq!(unsealed.fingerprint, fingerprint::digest(&packet));
        }
    }

    #[test]
    fn known_envelope_vector() {
        // "ESP-01:24.3" is 11 bytes, padded with five 0x05 bytes to one block.
        let envelope = seal(
            "ESP-01",
            ScalarReading::from_tenths(243),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        assert_eq!(envelope.to_hex(), "18e6b8aa23c2c0e9140fe2559a2ae01d");

        let unsealed = unseal(&envelope, &fixed_key(), &fixed_iv(), demo_range()).unwrap();
        assert_eq!(unsealed.device_id.as_str(), "ESP-01");
        assert_eq!(unsealed.value, ScalarReading::from_tenths(243));
        assert_eq!(
            unsealed.fingerprint.to_hex(),
            "c88c233469816341b71f7c29b8ed7c74ed661d42762e00988b4dbaad55a444b9"
        );
    }

    #[test]
    fn known_two_block_vector() {
        // 20-byte packet spans two blocks.
        let envelope = seal(
            "ESP-STATION-22",
            ScalarReading::from_tenths(1284),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        assert_eq!(
            envelope.to_hex(),
            "73b0b8b418c6c10b66868be2481005d30ad216ba22e200fc1bb3c27bb97830dc"
        );
    }

    #[test]
    fn aligned_packet_gains_full_padding_block() {
        // "ESP-001:-12345.6" is exactly 16 bytes; sealing must append a
        // whole padding block rather than leave it unpadded.
        let envelope = seal(
            "ESP-001",
            ScalarReading::from_tenths(-123_456),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        assert_eq!(envelope.len(), 32);
        assert_eq!(
            envelope.to_hex(),
            "f17e5e3cd516ebe95b40e257221979bd81563e7db7e55b7842fac1d6af3fad1c"
        );
        let unsealed = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range()).unwrap();
        assert_eq!(unsealed.value, ScalarReading::from_tenths(-123_456));
    }

    #[test]
    fn seal_rejects_invalid_identity() {
        let result = seal("", ScalarReading::from_tenths(1), &fixed_key(), &fixed_iv());
        assert!(matches!(result, Err(SealError::Encoding(_))));
    }

    #[test]
    fn unseal_rejects_misaligned_envelope() {
        let envelope = Envelope::from_bytes(vec![0u8; 15]);
        let result = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range());
        assert!(matches!(result, Err(UnsealError::Alignment(_))));
    }

    #[test]
    fn unseal_rejects_empty_envelope() {
        let envelope = Envelope::from_bytes(Vec::new());
        let result = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range());
        assert!(matches!(
            result,
            Err(UnsealError::Padding(PaddingError::Empty))
        ));
    }

    #[test]
    fn out_of_range_value_is_rejected_as_attestation_failure() {
        // Structurally valid packet, implausible value.
        let envelope = seal(
            "ESP-01",
            ScalarReading::from_tenths(9999),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        let result = unseal(&envelope, &fixed_key(), &fixed_iv(), demo_range());
        assert!(matches!(
            result,
            Err(UnsealError::Attestation(AttestationError { value, .. }))
                if value == ScalarReading::from_tenths(9999)
        ));
    }

    #[test]
    fn range_bounds_are_accepted() {
        for tenths in [150, 350] {
            let value = ScalarReading::from_tenths(tenths);
            let envelope = seal("ESP-01", value, &fixed_key(), &fixed_iv()).unwrap();
            let unsealed = unseal(&envelope, &fixed_key(), &fixed_iv(), demo_range()).unwrap();
            assert_eq!(unsealed.value, value);
        }
    }

    #[test]
    fn tampered_envelope_never_passes_unchanged() {
        let one_block = seal(
            "ESP-01",
            ScalarReading::from_tenths(243),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        let two_block = seal(
            "ESP-STATION-22",
            ScalarReading::from_tenths(1284),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();

        for sealed in [one_block, two_block] {
            let original = unseal(&sealed, &fixed_key(), &fixed_iv(), wide_range()).unwrap();
            for byte in 0..sealed.len() {
                for bit in 0..8 {
                    let mut bytes = sealed.as_bytes().to_vec();
                    bytes[byte] ^= 1 << bit;
                    let tampered = Envelope::from_bytes(bytes);
                    match unseal(&tampered, &fixed_key(), &fixed_iv(), wide_range()) {
                        Err(_) => {}
                        // A forgery that still decodes must carry a
                        // different packet, hence a different fingerprint.
                        Ok(unsealed) => {
                            assert_ne!(unsealed.fingerprint, original.fingerprint)
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn wrong_key_never_recovers_reading() {
        let envelope = seal(
            "ESP-01",
            ScalarReading::from_tenths(243),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        let original = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range()).unwrap();
        let other = Key::from_bytes([0x13; 16]);
        match unseal(&envelope, &other, &fixed_iv(), wide_range()) {
            Err(_) => {}
            Ok(unsealed) => assert_ne!(unsealed.fingerprint, original.fingerprint),
        }
    }

    #[test]
    fn iv_mismatch_garbles_first_block() {
        // With a one-block envelope a wrong IV garbles everything.
        let envelope = seal(
            "ESP-01",
            ScalarReading::from_tenths(243),
            &fixed_key(),
            &fixed_iv(),
        )
        .unwrap();
        let other_iv = Iv::from_bytes([0xAA; 16]);
        let original = unseal(&envelope, &fixed_key(), &fixed_iv(), wide_range()).unwrap();
        match unseal(&envelope, &fixed_key(), &other_iv, wide_range()) {
            Err(_) => {}
            Ok(unsealed) => assert_ne!(unsealed.fingerprint, original.fingerprint),
        }
    }
}
