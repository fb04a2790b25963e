//! Bit-packing helpers.
//!
//! Converts between packed bytes and one-bit-per-element buffers. Bits are
//! always ordered most-significant first within a byte.

use crate::error::{Error, Result};
use bitvec::prelude::*;

/// XOR-parity of the set bits in `word` (1 if odd).
#[inline]
pub fn parity(word: u32) -> u8 {
    (word.count_ones() & 1) as u8
}

/// Unpacks `bytes` into `bits`, one bit per element, MSB first.
///
/// Writes exactly `8 * bytes.len()` elements and returns that count.
///
/// # Errors
///
/// Returns [`Error::BufferLength`] if `bits` cannot hold every unpacked bit.
pub fn unpack_bytes(bytes: &[u8], bits: &mut [u8]) -> Result<usize> {
    let needed = 8 * bytes.len();
    if bits.len() < needed {
        return Err(Error::buffer_length("unpacked bit", needed, bits.len()));
    }

    for (dst, bit) in bits.iter_mut().zip(bytes.view_bits::<Msb0>().iter().by_vals()) {
        *dst = u8::from(bit);
    }

    Ok(needed)
}

/// Packs one-bit-per-element `bits` into `bytes`, MSB first.
///
/// Only the least-significant bit of each element is used. A trailing partial
/// byte is padded with zeros. Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`Error::BufferLength`] if `bytes` is too short.
pub fn pack_bytes(bits: &[u8], bytes: &mut [u8]) -> Result<usize> {
    let needed = bits.len().div_ceil(8);
    if bytes.len() < needed {
        return Err(Error::buffer_length("packed byte", needed, bytes.len()));
    }

    let out = &mut bytes[..needed];
    out.fill(0);
    let out_bits = out.view_bits_mut::<Msb0>();
    for (i, &bit) in bits.iter().enumerate() {
        out_bits.set(i, bit & 1 != 0);
    }

    Ok(needed)
}
