pub mod ecc;
pub mod error;

pub use ecc::{ConvCodec, ConvScheme, ErrorCorrection};
pub use error::{Error, Result};
