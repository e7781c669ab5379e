//! Attestation envelope pipeline.
//!
//! A sensor reading travels through four pure stages on its way to the
//! collection service:
//!
//! ```text
//! (identity, value) --encode--> canonical packet --pad--> padded bytes
//!     --encrypt--> envelope --[transport]--> decrypt --unpad--> packet
//!     --decode--> (identity, value)  +  SHA-256 fingerprint of the packet
//! ```
//!
//! [`seal`] and [`unseal`] compose the stages for each side. Every stage is
//! a synchronous function over in-memory bytes; nothing here performs IO,
//! so the pipeline can be exercised exhaustively in tests.
//!
//! The envelope carries no authentication tag. Tampering and wrong keys
//! surface as padding or decoding failures, or as a fingerprint that no
//! longer matches the sender's packet; the accepted-range check in
//! [`unseal`] stops structurally valid garbage from passing as a reading.

pub mod cipher;
pub mod fingerprint;
pub mod packet;
pub mod padding;
pub mod seal;
pub mod types;

pub use cipher::BLOCK_SIZE;
pub use fingerprint::Fingerprint;
pub use seal::{seal, unseal, SealError, Unsealed, UnsealError};
pub use types::{AcceptedRange, DeviceId, Envelope, Iv, Key, ScalarReading};
