//! Contract between the codec and a trellis decoding engine.
//!
//! The codec never performs the maximum-likelihood search itself. It drives an
//! engine through a fixed lifecycle:
//!
//! 1. [`TrellisBackend::create`] sized for a number of decision steps
//! 2. [`TrellisEngine::init`] with the start state
//! 3. [`TrellisEngine::update_block`] with every soft symbol of the frame
//! 4. [`TrellisEngine::chainback`] to recover the packed message bits
//! 5. [`TrellisBackend::destroy`] once the instance is no longer the right size
//!
//! A decision step consumes R soft symbols (one per generator polynomial).
//! The codec always starts and terminates the search in state 0.

use crate::ecc::scheme::ConvScheme;
use crate::error::{Error, Result};

#[cfg(feature = "viterbi")]
pub mod viterbi;

#[cfg(feature = "viterbi")]
pub use viterbi::{Viterbi, ViterbiBackend};

/// Soft decision value fed to the engine, 0 = certain zero, 255 = certain one.
pub type SoftBit = u8;

/// Soft value for a received 0 bit.
pub const SOFTBIT_0: SoftBit = 0;
/// Soft value for a received 1 bit.
pub const SOFTBIT_1: SoftBit = 255;
/// Soft value carrying no information about the bit.
pub const SOFTBIT_ERASURE: SoftBit = 127;

/// Maps a hard bit to its two-level soft value.
#[inline]
pub fn hard_to_soft(bit: u8) -> SoftBit {
    if bit != 0 {
        SOFTBIT_1
    } else {
        SOFTBIT_0
    }
}

/// Entry points that create and release engine instances.
pub trait TrellisBackend {
    /// Engine instance type produced by this backend.
    type Engine: TrellisEngine;

    /// Allocates an engine for `scheme` sized for `decision_steps` trellis steps.
    fn create(&self, scheme: ConvScheme, decision_steps: usize) -> Result<Self::Engine>;

    /// Releases an engine instance and everything it owns.
    fn destroy(&self, engine: Self::Engine) {
        drop(engine);
    }
}

/// A trellis decoder instance.
pub trait TrellisEngine {
    /// Code variant the instance was created for.
    fn scheme(&self) -> ConvScheme;

    /// Number of decision steps the instance was created for.
    fn decision_steps(&self) -> usize;

    /// Resets accumulated path metrics, favouring `start_state`.
    fn init(&mut self, start_state: usize);

    /// Feeds `steps` decision steps worth of soft symbols (`steps * R` values).
    ///
    /// `steps` must equal [`TrellisEngine::decision_steps`].
    fn update_block(&mut self, symbols: &[SoftBit], steps: usize) -> Result<()>;

    /// Traces back from `end_state` and writes the first `nbits` decoded bits
    /// into `out`, packed MSB first.
    fn chainback(&self, out: &mut [u8], nbits: usize, end_state: usize) -> Result<()>;
}

/// Engine type of builds without a trellis engine. It has no values, so a
/// codec bound to [`NullBackend`] can only ever be in degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoEngine {}

impl TrellisEngine for NoEngine {
    fn scheme(&self) -> ConvScheme {
        match *self {}
    }

    fn decision_steps(&self) -> usize {
        match *self {}
    }

    fn init(&mut self, _start_state: usize) {
        match *self {}
    }

    fn update_block(&mut self, _symbols: &[SoftBit], _steps: usize) -> Result<()> {
        match *self {}
    }

    fn chainback(&self, _out: &mut [u8], _nbits: usize, _end_state: usize) -> Result<()> {
        match *self {}
    }
}

/// Backend standing in for an unavailable engine; every `create` fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullBackend;

impl TrellisBackend for NullBackend {
    type Engine = NoEngine;

    fn create(&self, scheme: ConvScheme, _decision_steps: usize) -> Result<NoEngine> {
        Err(Error::EngineContract(format!(
            "no trellis engine compiled in for {}",
            scheme
        )))
    }
}

/// Backend used by [`ConvCodec::new`](crate::ecc::ConvCodec::new).
#[cfg(feature = "viterbi")]
pub type DefaultBackend = ViterbiBackend;

/// Backend used by [`ConvCodec::new`](crate::ecc::ConvCodec::new).
#[cfg(not(feature = "viterbi"))]
pub type DefaultBackend = NullBackend;

/// Default backend instance.
#[cfg(feature = "viterbi")]
pub(crate) fn default_backend() -> Option<DefaultBackend> {
    Some(ViterbiBackend)
}

/// No engine compiled in: handles start degraded.
#[cfg(not(feature = "viterbi"))]
pub(crate) fn default_backend() -> Option<DefaultBackend> {
    None
}
