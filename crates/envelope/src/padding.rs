//! Deterministic block padding.
//!
//! Always-pad variant: every input gains at least one padding byte, and an
//! already aligned input gains a full block. Each padding byte carries the
//! padding length, so stripping never needs an out-of-band length field
//! and is always unambiguous.

use thiserror::Error;

/// Errors produced when stripping padding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaddingError {
    /// The padded input is empty.
    #[error("padded input is empty")]
    Empty,

    /// The padded length is not a whole number of blocks.
    #[error("padded length {len} is not a multiple of block size {block_size}")]
    Misaligned {
        /// Offending input length.
        len: usize,
        /// Block size in force.
        block_size: usize,
    },

    /// The final byte is not a plausible padding length.
    #[error("padding length byte {0:#04x} out of range")]
    InvalidFill(u8),

    /// The trailing bytes do not all carry the padding length.
    #[error("inconsistent padding fill")]
    InconsistentFill,
}

/// Pad `data` up to the next multiple of `block_size`.
///
/// Appends N bytes of value N, where N is the distance to the next block
/// boundary; a full block of value `block_size` when already aligned.
/// `block_size` must be between 1 and 255 so the fill fits one byte.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&block_size));
    let fill = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + fill);
    padded.extend_from_slice(data);
    padded.resize(data.len() + fill, fill as u8);
    padded
}

/// Strip the padding applied by [`pad`].
///
/// # Errors
///
/// Returns a [`PaddingError`] if the input is empty, misaligned, or its
/// trailing bytes are not a consistent fill of a value in
/// `1..=block_size`. After decryption this usually means a tampered or
/// wrong-key envelope rather than a local bug.
pub fn unpad(data: &[u8], block_size: usize) -> Result<Vec<u8>, PaddingError> {
    debug_assert!((1..=255).contains(&block_size));
    let Some(&fill) = data.last() else {
        return Err(PaddingError::Empty);
    };
    if data.len() % block_size != 0 {
        return Err(PaddingError::Misaligned {
            len: data.len(),
            block_size,
        });
    }
    let fill_len = usize::from(fill);
    if fill_len == 0 || fill_len > block_size {
        return Err(PaddingError::InvalidFill(fill));
    }
    let (kept, tail) = data.split_at(data.len() - fill_len);
    if tail.iter().any(|&b| b != fill) {
        return Err(PaddingError::InconsistentFill);
    }
    Ok(kept.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BS: usize = 16;

    #[test]
    fn pads_partial_block() {
        let padded = pad(b"ESP-01:24.3", BS);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..11], b"ESP-01:24.3");
        assert_eq!(&padded[11..], &[5, 5, 5, 5, 5]);
    }

    #[test]
    fn aligned_input_gains_full_block() {
        let data = [0xABu8; 16];
        let padded = pad(&data, BS);
        assert_eq!(padded.len(), 32);
        assert_eq!(&padded[16..], &[16u8; 16]);
    }

    #[test]
    fn empty_input_pads_to_one_block() {
        let padded = pad(b"", BS);
        assert_eq!(padded, vec![16u8; 16]);
        assert_eq!(unpad(&padded, BS).unwrap(), b"");
    }

    #[test]
    fn round_trips_every_length_up_to_four_blocks() {
        for len in 0..=4 * BS {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let padded = pad(&data, BS);
            assert_eq!(padded.len() % BS, 0, "len {len}");
            assert!(padded.len() > data.len(), "len {len}");
            assert_eq!(unpad(&padded, BS).unwrap(), data, "len {len}");
        }
    }

    #[test]
    fn unpad_rejects_empty() {
        assert_eq!(unpad(b"", BS), Err(PaddingError::Empty));
    }

    #[test]
    fn unpad_rejects_misaligned() {
        assert_eq!(
            unpad(&[5u8; 15], BS),
            Err(PaddingError::Misaligned {
                len: 15,
                block_size: BS
            })
        );
    }

    #[test]
    fn unpad_rejects_zero_fill() {
        let mut block = [7u8; 16];
        block[15] = 0;
        assert_eq!(unpad(&block, BS), Err(PaddingError::InvalidFill(0)));
    }

    #[test]
    fn unpad_rejects_oversized_fill() {
        let mut block = [7u8; 16];
        block[15] = 17;
        assert_eq!(unpad(&block, BS), Err(PaddingError::InvalidFill(17)));
    }

    #[test]
    fn unpad_rejects_inconsistent_fill() {
        let mut padded = pad(b"ESP-01:24.3", BS);
        // Corrupt one interior padding byte.
        padded[12] = 4;
        assert_eq!(unpad(&padded, BS), Err(PaddingError::InconsistentFill));
    }

    #[test]
    fn works_with_other_block_sizes() {
        let data = b"abcdef";
        let padded = pad(data, 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[6..], &[2, 2]);
        assert_eq!(unpad(&padded, 8).unwrap(), data);
    }
}
