//! Convolutional encoder.
//!
//! Each message bit (MSB first within a byte) is shifted into a K-bit register
//! and R parity bits are emitted, one per generator polynomial. After the
//! message the register is flushed with K-1 zero bits so the encoder finishes
//! in the all-zero state; the decoder relies on that known end state. Output
//! bits are packed MSB first and the last byte is zero padded.
//!
//! The encoder holds no state between calls.

use crate::ecc::bits::parity;
use crate::ecc::scheme::ConvScheme;
use crate::error::{Error, Result};

/// Packs parity bits into an output buffer, MSB first.
struct BitWriter<'a> {
    out: &'a mut [u8],
    byte: u8,
    written: usize,
}

impl<'a> BitWriter<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self {
            out,
            byte: 0,
            written: 0,
        }
    }

    #[inline]
    fn push(&mut self, bit: u8) {
        self.byte = (self.byte << 1) | bit;
        self.written += 1;
        if self.written % 8 == 0 {
            self.out[self.written / 8 - 1] = self.byte;
        }
    }

    /// Zero-pads up to the next byte boundary and returns the total bit count.
    fn finish(mut self) -> usize {
        while self.written % 8 != 0 {
            self.push(0);
        }
        self.written
    }
}

/// Shifts `bit` into `register` and emits one parity bit per polynomial.
#[inline]
fn shift_and_emit(register: &mut u32, bit: u8, mask: u32, polys: &[u32], writer: &mut BitWriter) {
    *register = ((*register << 1) | u32::from(bit)) & mask;
    for &poly in polys {
        writer.push(parity(*register & poly));
    }
}

/// Encodes `msg` with `scheme` into `out`.
///
/// `out` must hold at least [`ConvScheme::encoded_len`]`(msg.len())` bytes;
/// exactly that many are written and the count is returned.
///
/// # Errors
///
/// Returns [`Error::BufferLength`] if `out` is too short.
///
/// # Panics
///
/// Panics if the number of emitted bits disagrees with the encoded-length
/// formula, which would indicate a defect in the encoder itself.
pub fn encode(scheme: ConvScheme, msg: &[u8], out: &mut [u8]) -> Result<usize> {
    let enc_len = scheme.encoded_len(msg.len());
    if out.len() < enc_len {
        return Err(Error::buffer_length("encoded", enc_len, out.len()));
    }

    let polys = scheme.polynomials();
    let mask = (1u32 << scheme.constraint_length()) - 1;
    let mut register = 0u32;
    let mut writer = BitWriter::new(&mut out[..enc_len]);

    for &byte in msg {
        for j in (0..8).rev() {
            shift_and_emit(&mut register, (byte >> j) & 1, mask, polys, &mut writer);
        }
    }

    // zero tail
    for _ in 0..scheme.tail_bits() {
        shift_and_emit(&mut register, 0, mask, polys, &mut writer);
    }
    // only the low K-1 bits carry state into the next step
    debug_assert_eq!(register & (mask >> 1), 0);

    let total_bits = writer.finish();
    assert_eq!(
        total_bits,
        8 * enc_len,
        "{}: emitted {} bits for a {}-byte message",
        scheme,
        total_bits,
        msg.len()
    );

    Ok(enc_len)
}

/// Encodes `msg` into a freshly allocated buffer.
pub fn encode_to_vec(scheme: ConvScheme, msg: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; scheme.encoded_len(msg.len())];
    // the buffer is sized from the same formula encode() checks against
    if let Err(e) = encode(scheme, msg, &mut out) {
        unreachable!("encoder rejected its own buffer: {}", e);
    }
    out
}
