//! AES-128-CBC over whole cipher blocks.
//!
//! The block transform is the `aes` crate's AES-128 (full key schedule,
//! ten rounds); the CBC chaining and alignment rules live here. The mode
//! carries no authentication tag: tampering surfaces downstream as a
//! padding failure or a fingerprint mismatch, never at this layer.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use thiserror::Error;

use crate::types::{Iv, Key};

/// Cipher block width in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Input length is not a whole number of cipher blocks.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("input length {len} is not a multiple of the {BLOCK_SIZE}-byte block size")]
pub struct AlignmentError {
    /// Offending input length.
    pub len: usize,
}

/// Encrypt padded plaintext under `key`, chaining from `iv`.
///
/// Each plaintext block is XORed with the previous ciphertext block (the
/// IV for the first) before the block transform, so repeated plaintext
/// blocks encrypt differently within a message. Chaining makes each
/// message strictly sequential; distinct messages can run concurrently.
///
/// # Errors
///
/// Returns [`AlignmentError`] if `plaintext` is not already padded to a
/// multiple of [`BLOCK_SIZE`].
pub fn encrypt(plaintext: &[u8], key: &Key, iv: &Iv) -> Result<Vec<u8>, AlignmentError> {
    ensure_aligned(plaintext.len())?;

    let cipher = Aes128::new(key.as_bytes().into());
    let mut chain = *iv.as_bytes();
    let mut ciphertext = Vec::with_capacity(plaintext.len());

    for block in plaintext.chunks_exact(BLOCK_SIZE) {
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(block);
        for (b, c) in buf.iter_mut().zip(chain.iter()) {
            *b ^= c;
        }
        cipher.encrypt_block((&mut buf).into());
        chain = buf;
        ciphertext.extend_from_slice(&buf);
    }

    Ok(ciphertext)
}

/// Decrypt ciphertext under `key`, chaining from `iv`.
///
/// A wrong key yields garbage rather than an error here; unauthenticated
/// CBC cannot tell. Callers detect it downstream when padding or packet
/// decoding fails, or the value lands outside the accepted range.
///
/// # Errors
///
/// Returns [`AlignmentError`] if `ciphertext` is not a multiple of
/// [`BLOCK_SIZE`].
pub fn decrypt(ciphertext: &[u8], key: &Key, iv: &Iv) -> Result<Vec<u8>, AlignmentError> {
    ensure_aligned(ciphertext.len())?;

    let cipher = Aes128::new(key.as_bytes().into());
    let mut chain = *iv.as_bytes();
    let mut plaintext = Vec::with_capacity(ciphertext.len());

    for block in ciphertext.chunks_exact(BLOCK_SIZE) {
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(block);
        cipher.decrypt_block((&mut buf).into());
        for (b, c) in buf.iter_mut().zip(chain.iter()) {
            *b ^= c;
        }
        chain.copy_from_slice(block);
        plaintext.extend_from_slice(&buf);
    }

    Ok(plaintext)
}

fn ensure_aligned(len: usize) -> Result<(), AlignmentError> {
    if len % BLOCK_SIZE != 0 {
        return Err(AlignmentError { len });
    }
    Ok(())
}
