//! Convolutional codec handle.
//!
//! [`ConvCodec`] binds a [`ConvScheme`] to a trellis engine backend and owns
//! the decode-side resources: the soft symbol buffer and the engine instance.
//! Both are sized for one message length at a time and together form a single
//! buffer generation. Decoding at the same length reuses the generation;
//! decoding at a new length releases the old generation before the new one is
//! built, so a handle never holds two engines at once.
//!
//! Encoding is stateless and simply delegates to [`encoder::encode`].
//!
//! A handle created without a backend is in degraded mode: encode and decode
//! return `Ok(0)`, allocate nothing and leave caller buffers untouched. Check
//! [`ConvCodec::is_available`] before trusting any output.
//!
//! A handle is not meant to be shared between threads; independent handles
//! share no state and may be used from different threads freely.

use crate::ecc::bits::unpack_bytes;
use crate::ecc::encoder;
use crate::ecc::scheme::ConvScheme;
use crate::ecc::trellis::{
    default_backend, hard_to_soft, DefaultBackend, SoftBit, TrellisBackend, TrellisEngine,
    SOFTBIT_0,
};
use crate::ecc::ErrorCorrection;
use crate::error::{Error, Result};
use log::{debug, trace};
use std::fmt;

/// Start and end state of every trellis search (zero-tail termination).
const ZERO_STATE: usize = 0;

/// Decode resources sized for one message length.
struct Generation<E> {
    dec_len: usize,
    enc_len: usize,
    /// `8 * enc_len` soft symbols
    symbols: Vec<SoftBit>,
    engine: E,
}

/// Convolutional encoder/decoder for one code variant.
pub struct ConvCodec<B: TrellisBackend = DefaultBackend> {
    scheme: ConvScheme,
    backend: Option<B>,
    generation: Option<Generation<B::Engine>>,
}

impl ConvCodec {
    /// Creates a codec for `scheme` using the engine compiled into this build.
    ///
    /// Without the `viterbi` feature the handle is degraded; see
    /// [`ConvCodec::is_available`].
    pub fn new(scheme: ConvScheme) -> Self {
        Self::with_backend(scheme, default_backend())
    }

    /// Creates a codec for `scheme` with no trellis engine.
    pub fn degraded(scheme: ConvScheme) -> Self {
        Self::with_backend(scheme, None)
    }
}

impl<B: TrellisBackend> ConvCodec<B> {
    /// Creates a codec for `scheme` bound to `backend`; `None` gives a degraded handle.
    pub fn with_backend(scheme: ConvScheme, backend: Option<B>) -> Self {
        if backend.is_none() {
            debug!("{} codec created without a trellis engine", scheme);
        }
        Self {
            scheme,
            backend,
            generation: None,
        }
    }

    /// The code variant this handle was created for.
    pub fn scheme(&self) -> ConvScheme {
        self.scheme
    }

    /// Code rate 1/R.
    pub fn rate(&self) -> f32 {
        self.scheme.rate()
    }

    /// `false` when the handle has no trellis engine and every operation is a no-op.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Message length (bytes) the current decode buffers are sized for, 0 if none.
    pub fn dec_len(&self) -> usize {
        self.generation.as_ref().map_or(0, |g| g.dec_len)
    }

    /// Encoded length (bytes) matching [`ConvCodec::dec_len`], 0 if no buffers exist.
    pub fn enc_len(&self) -> usize {
        self.generation.as_ref().map_or(0, |g| g.enc_len)
    }

    /// Whether an engine instance is currently alive.
    pub fn has_engine(&self) -> bool {
        self.generation.is_some()
    }

    /// Encoded length in bytes of a `dec_len`-byte message.
    pub fn encoded_len(&self, dec_len: usize) -> usize {
        self.scheme.encoded_len(dec_len)
    }

    /// Encodes `msg` into `out`, returning the number of bytes written.
    ///
    /// Writes nothing and returns 0 on a degraded handle.
    pub fn encode(&self, msg: &[u8], out: &mut [u8]) -> Result<usize> {
        if !self.is_available() {
            return Ok(0);
        }
        encoder::encode(self.scheme, msg, out)
    }

    /// Decodes `enc` into `out`; `out.len()` is the message length L.
    ///
    /// `enc` must hold at least [`ConvScheme::encoded_len`]`(L)` bytes. Returns
    /// the number of decoded bytes, or 0 on a degraded handle (nothing written).
    pub fn decode(&mut self, enc: &[u8], out: &mut [u8]) -> Result<usize> {
        if !self.is_available() {
            return Ok(0);
        }

        let dec_len = out.len();
        let enc_len = self.scheme.encoded_len(dec_len);
        if enc.len() < enc_len {
            return Err(Error::buffer_length("encoded", enc_len, enc.len()));
        }

        let scheme = self.scheme;
        let generation = self.ensure_capacity(dec_len)?;

        unpack_bytes(&enc[..enc_len], &mut generation.symbols)?;
        trace!("{} encoded bits: {:?}", scheme, generation.symbols);
        for symbol in generation.symbols.iter_mut() {
            *symbol = hard_to_soft(*symbol);
        }

        run_trellis(scheme, &mut generation.engine, &generation.symbols, out)?;
        trace!("{} decoded: {}", scheme, hex::encode(&*out));
        Ok(dec_len)
    }

    /// Decodes soft symbols (one per encoded bit, 0 = certain zero, 255 = certain one).
    ///
    /// `soft` must hold at least `R * (8*L + K - 1)` symbols where L is `out.len()`.
    /// Returns the number of decoded bytes, or 0 on a degraded handle.
    pub fn decode_soft(&mut self, soft: &[SoftBit], out: &mut [u8]) -> Result<usize> {
        if !self.is_available() {
            return Ok(0);
        }

        let dec_len = out.len();
        let needed = self.scheme.rate_denominator() * self.scheme.decision_steps(dec_len);
        if soft.len() < needed {
            return Err(Error::buffer_length("soft symbol", needed, soft.len()));
        }

        let scheme = self.scheme;
        let generation = self.ensure_capacity(dec_len)?;
        run_trellis(scheme, &mut generation.engine, soft, out)?;
        Ok(dec_len)
    }

    /// Encodes `msg` into a new buffer; empty on a degraded handle.
    pub fn encode_to_vec(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if !self.is_available() {
            return Ok(Vec::new());
        }
        Ok(encoder::encode_to_vec(self.scheme, msg))
    }

    /// Decodes a `dec_len`-byte message into a new buffer; empty on a degraded handle.
    pub fn decode_to_vec(&mut self, enc: &[u8], dec_len: usize) -> Result<Vec<u8>> {
        if !self.is_available() {
            return Ok(Vec::new());
        }
        let mut out = vec![0u8; dec_len];
        self.decode(enc, &mut out)?;
        Ok(out)
    }

    /// Sizes the decode buffers and engine for `dec_len`-byte messages ahead
    /// of the first decode. A no-op when already sized or degraded.
    pub fn set_length(&mut self, dec_len: usize) -> Result<()> {
        if self.is_available() {
            self.ensure_capacity(dec_len)?;
        }
        Ok(())
    }

    /// Releases the engine instance and decode buffers, if any.
    pub fn reset(&mut self) {
        if let Some(generation) = self.generation.take() {
            self.release(generation);
        }
    }

    fn release(&self, generation: Generation<B::Engine>) {
        debug!(
            "releasing {} trellis engine, {} frame bytes",
            self.scheme, generation.dec_len
        );
        let Generation {
            symbols, engine, ..
        } = generation;
        if let Some(backend) = &self.backend {
            backend.destroy(engine);
        }
        drop(symbols);
    }

    /// Makes sure the buffer generation is sized for `dec_len` message bytes.
    fn ensure_capacity(&mut self, dec_len: usize) -> Result<&mut Generation<B::Engine>> {
        let generation = match self.generation.take() {
            Some(current) if current.dec_len == dec_len => current,
            stale => {
                if let Some(old) = stale {
                    self.release(old);
                }
                self.create_generation(dec_len)?
            }
        };
        Ok(self.generation.insert(generation))
    }

    fn create_generation(&self, dec_len: usize) -> Result<Generation<B::Engine>> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            Error::EngineContract(format!("{} codec has no trellis engine", self.scheme))
        })?;

        debug!(
            "(re)creating {} trellis engine, {} frame bytes",
            self.scheme, dec_len
        );

        let steps = self.scheme.decision_steps(dec_len);
        let engine = backend.create(self.scheme, steps)?;
        if engine.scheme() != self.scheme || engine.decision_steps() != steps {
            let msg = format!(
                "backend returned a {} engine with {} steps for a {} codec needing {}",
                engine.scheme(),
                engine.decision_steps(),
                self.scheme,
                steps
            );
            backend.destroy(engine);
            return Err(Error::EngineContract(msg));
        }

        let enc_len = self.scheme.encoded_len(dec_len);
        Ok(Generation {
            dec_len,
            enc_len,
            symbols: vec![SOFTBIT_0; 8 * enc_len],
            engine,
        })
    }

    #[cfg(test)]
    fn symbols_ptr(&self) -> Option<*const SoftBit> {
        self.generation.as_ref().map(|g| g.symbols.as_ptr())
    }
}

/// Drives one init/update/chainback cycle with zero start and end states.
fn run_trellis<E: TrellisEngine>(
    scheme: ConvScheme,
    engine: &mut E,
    symbols: &[SoftBit],
    out: &mut [u8],
) -> Result<()> {
    let steps = scheme.decision_steps(out.len());
    engine.init(ZERO_STATE);
    engine.update_block(symbols, steps)?;
    engine.chainback(out, 8 * out.len(), ZERO_STATE)
}

impl<B: TrellisBackend> Drop for ConvCodec<B> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<B: TrellisBackend> fmt::Debug for ConvCodec<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvCodec")
            .field("scheme", &self.scheme)
            .field("available", &self.is_available())
            .field("dec_len", &self.dec_len())
            .field("enc_len", &self.enc_len())
            .finish()
    }
}

impl<B: TrellisBackend> ErrorCorrection for ConvCodec<B> {
    fn encoded_len(&self, dec_len: usize) -> usize {
        ConvCodec::encoded_len(self, dec_len)
    }

    fn encode(&self, msg: &[u8], out: &mut [u8]) -> Result<usize> {
        ConvCodec::encode(self, msg, out)
    }

    fn decode(&mut self, enc: &[u8], out: &mut [u8]) -> Result<usize> {
        ConvCodec::decode(self, enc, out)
    }
}
