//! Supported convolutional code variants.
//!
//! Each variant fixes a constraint length K, a rate 1/R and the R generator
//! polynomials used as parity taps. The polynomials are written with the
//! newest register bit in the least-significant position, matching the way the
//! encoder shifts bits into its register.
//!
//! | Scheme | K  | Rate | d_free |
//! |--------|----|------|--------|
//! | V27    | 7  | 1/2  | 10     |
//! | V29    | 9  | 1/2  | 12     |
//! | V39    | 9  | 1/3  | 18     |
//! | V615   | 15 | 1/6  | 56     |

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const V27_POLYS: [u32; 2] = [0x4f, 0x6d];
const V29_POLYS: [u32; 2] = [0x1af, 0x11d];
const V39_POLYS: [u32; 3] = [0x1ed, 0x19b, 0x127];
const V615_POLYS: [u32; 6] = [0o42631, 0o47245, 0o56507, 0o73363, 0o77267, 0o64537];

/// A convolutional code variant. Selected once when a codec is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvScheme {
    /// r1/2, K=7 (NASA standard)
    V27,
    /// r1/2, K=9
    V29,
    /// r1/3, K=9
    V39,
    /// r1/6, K=15
    V615,
}

impl ConvScheme {
    /// Every supported variant, in table order.
    pub const ALL: [ConvScheme; 4] = [
        ConvScheme::V27,
        ConvScheme::V29,
        ConvScheme::V39,
        ConvScheme::V615,
    ];

    /// Constraint length K: register bits influencing each output symbol.
    pub const fn constraint_length(self) -> usize {
        match self {
            ConvScheme::V27 => 7,
            ConvScheme::V29 | ConvScheme::V39 => 9,
            ConvScheme::V615 => 15,
        }
    }

    /// Number of generator polynomials R (the code rate is 1/R).
    pub const fn rate_denominator(self) -> usize {
        self.polynomials().len()
    }

    /// Generator polynomials, in output order.
    pub const fn polynomials(self) -> &'static [u32] {
        match self {
            ConvScheme::V27 => &V27_POLYS,
            ConvScheme::V29 => &V29_POLYS,
            ConvScheme::V39 => &V39_POLYS,
            ConvScheme::V615 => &V615_POLYS,
        }
    }

    /// Code rate 1/R.
    pub fn rate(self) -> f32 {
        1.0 / self.rate_denominator() as f32
    }

    /// Number of zero bits flushed through the register after the message (K-1).
    pub const fn tail_bits(self) -> usize {
        self.constraint_length() - 1
    }

    /// Number of trellis states, 2^(K-1).
    pub const fn num_states(self) -> usize {
        1 << self.tail_bits()
    }

    /// Free distance of the code.
    pub const fn free_distance(self) -> usize {
        match self {
            ConvScheme::V27 => 10,
            ConvScheme::V29 => 12,
            ConvScheme::V39 => 18,
            ConvScheme::V615 => 56,
        }
    }

    /// Number of channel bit errors per terminated frame that maximum-likelihood
    /// decoding is guaranteed to correct.
    pub const fn correctable_errors(self) -> usize {
        (self.free_distance() - 1) / 2
    }

    /// Trellis steps needed to decode `dec_len` bytes: the data bits plus the zero tail.
    pub const fn decision_steps(self, dec_len: usize) -> usize {
        8 * dec_len + self.tail_bits()
    }

    /// Encoded length in bytes of a `dec_len`-byte message:
    /// `ceil(R * (8*dec_len + K - 1) / 8)`.
    pub const fn encoded_len(self, dec_len: usize) -> usize {
        (self.rate_denominator() * self.decision_steps(dec_len)).div_ceil(8)
    }

    /// Short name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            ConvScheme::V27 => "v27",
            ConvScheme::V29 => "v29",
            ConvScheme::V39 => "v39",
            ConvScheme::V615 => "v615",
        }
    }

    /// Human readable description.
    pub const fn description(self) -> &'static str {
        match self {
            ConvScheme::V27 => "convolutional r1/2 K=7",
            ConvScheme::V29 => "convolutional r1/2 K=9",
            ConvScheme::V39 => "convolutional r1/3 K=9",
            ConvScheme::V615 => "convolutional r1/6 K=15",
        }
    }
}

impl fmt::Display for ConvScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConvScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConvScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownScheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_table() {
        let expected = [(7, 2), (9, 2), (9, 3), (15, 6)];
        for (scheme, (k, r)) in ConvScheme::ALL.iter().zip(expected) {
            assert_eq!(scheme.constraint_length(), k);
            assert_eq!(scheme.rate_denominator(), r);
            assert_eq!(scheme.polynomials().len(), r);
            for &poly in scheme.polynomials() {
                assert!(poly < (1 << k), "{} polynomial {:#x} wider than K", scheme, poly);
            }
        }
        assert_eq!(ConvScheme::V39.rate(), 1.0 / 3.0);
        assert_eq!(ConvScheme::V615.num_states(), 16384);
    }

    #[test]
    fn test_encoded_length_formula() {
        for scheme in ConvScheme::ALL {
            let k = scheme.constraint_length();
            let r = scheme.rate_denominator();
            for dec_len in 0..=256 {
                let bits = r * (8 * dec_len + k - 1);
                let expected = bits / 8 + usize::from(bits % 8 != 0);
                assert_eq!(scheme.encoded_len(dec_len), expected, "{} L={}", scheme, dec_len);
            }
        }
    }

    #[test]
    fn test_single_byte_v27_length() {
        assert_eq!(ConvScheme::V27.encoded_len(1), 4);
        assert_eq!(ConvScheme::V27.encoded_len(0), 2);
        assert_eq!(ConvScheme::V615.encoded_len(1), 17);
    }

    #[test]
    fn test_parse_names() {
        for scheme in ConvScheme::ALL {
            assert_eq!(scheme.name().parse::<ConvScheme>().unwrap(), scheme);
            assert_eq!(scheme.to_string().parse::<ConvScheme>().unwrap(), scheme);
        }
        assert_eq!("V615".parse::<ConvScheme>().unwrap(), ConvScheme::V615);
        assert_eq!(
            "rs8".parse::<ConvScheme>(),
            Err(Error::UnknownScheme("rs8".to_string()))
        );
    }

    #[test]
    fn test_correctable_errors() {
        assert_eq!(ConvScheme::V27.correctable_errors(), 4);
        assert_eq!(ConvScheme::V29.correctable_errors(), 5);
        assert_eq!(ConvScheme::V39.correctable_errors(), 8);
        assert_eq!(ConvScheme::V615.correctable_errors(), 27);
    }
}
