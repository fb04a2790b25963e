//! Convolutional forward error correction.
//!
//! A convolutional code turns every message bit into R parity bits computed
//! from the last K message bits held in a shift register. This module provides:
//!
//! - The table of supported code variants ([`ConvScheme`])
//! - A bit-exact, stateless encoder with zero-tail termination
//! - The decode-side adapter ([`ConvCodec`]) that owns its buffers and drives
//!   a trellis engine through its create/init/update/chainback lifecycle
//! - A bundled maximum-likelihood Viterbi engine (feature `viterbi`)
//!
//! # Examples
//!
//! ```rust
//! use convfec::ecc::{ConvCodec, ConvScheme};
//!
//! let mut codec = ConvCodec::new(ConvScheme::V27);
//! if codec.is_available() {
//!     let msg = b"hello";
//!     let mut encoded = codec.encode_to_vec(msg).unwrap();
//!     encoded[2] ^= 0x10; // channel error
//!     assert_eq!(codec.decode_to_vec(&encoded, msg.len()).unwrap(), msg);
//! }
//! ```

use crate::error::Result;

/// A forward error correction scheme operating on caller-sized buffers.
///
/// This is the seam a scheme-dispatch layer uses to treat different FEC
/// families uniformly.
pub trait ErrorCorrection {
    /// Encoded length in bytes of a `dec_len`-byte message.
    fn encoded_len(&self, dec_len: usize) -> usize;

    /// Encodes `msg` into `out`, returning the number of bytes written.
    fn encode(&self, msg: &[u8], out: &mut [u8]) -> Result<usize>;

    /// Decodes `enc` into `out` (whose length is the message length),
    /// returning the number of bytes written.
    fn decode(&mut self, enc: &[u8], out: &mut [u8]) -> Result<usize>;
}

pub mod bits;
pub mod convolutional;
pub mod encoder;
pub mod scheme;
pub mod trellis;

pub use bits::{pack_bytes, parity, unpack_bytes};
pub use convolutional::ConvCodec;
pub use encoder::{encode, encode_to_vec};
pub use scheme::ConvScheme;
pub use trellis::{
    hard_to_soft, NullBackend, SoftBit, TrellisBackend, TrellisEngine, SOFTBIT_0, SOFTBIT_1,
    SOFTBIT_ERASURE,
};

#[cfg(feature = "viterbi")]
pub use trellis::{Viterbi, ViterbiBackend};
