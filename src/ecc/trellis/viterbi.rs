//! Bundled Viterbi engine.
//!
//! A plain, exact maximum-likelihood search over the 2^(K-1) state trellis of
//! any supported scheme. The branch metric is the sum of absolute distances
//! between the received soft symbols and the symbols the branch would have
//! produced, so with two-level input it reduces to Hamming distance.
//!
//! State numbering: a state holds the last K-1 input bits, newest in the
//! least-significant position. Stepping from `prev` with input `b` gives the
//! K-bit register `(prev << 1) | b`, whose low K-1 bits are the next state.
//! One decision bit per state and step records which of the two predecessors
//! survived; chainback walks those bits backwards from the end state.

use crate::ecc::bits::parity;
use crate::ecc::scheme::ConvScheme;
use crate::ecc::trellis::{SoftBit, TrellisBackend, TrellisEngine, SOFTBIT_0, SOFTBIT_1};
use crate::error::{Error, Result};
use bitvec::prelude::*;
use log::debug;

/// Metric given to states the search has not reached yet.
const UNREACHABLE: u32 = u32::MAX / 2;

/// Backend creating [`Viterbi`] instances for every supported scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViterbiBackend;

impl TrellisBackend for ViterbiBackend {
    type Engine = Viterbi;

    fn create(&self, scheme: ConvScheme, decision_steps: usize) -> Result<Viterbi> {
        debug!(
            "creating {} viterbi decoder: {} states, {} decision steps",
            scheme,
            scheme.num_states(),
            decision_steps
        );
        Ok(Viterbi::new(scheme, decision_steps))
    }
}

/// Viterbi decoder sized for a fixed number of decision steps.
#[derive(Debug, Clone)]
pub struct Viterbi {
    scheme: ConvScheme,
    steps: usize,
    num_states: usize,
    /// Packed R-bit output pattern for each K-bit register value.
    branch_outputs: Vec<u8>,
    metrics: Vec<u32>,
    next_metrics: Vec<u32>,
    /// `words_per_step` words of survivor decisions per step.
    decisions: Vec<u64>,
    words_per_step: usize,
    /// Steps accumulated since the last `init`.
    accumulated: usize,
}

impl Viterbi {
    /// Creates a decoder for `scheme` able to accept `decision_steps` steps.
    pub fn new(scheme: ConvScheme, decision_steps: usize) -> Self {
        let num_states = scheme.num_states();
        let words_per_step = num_states.div_ceil(64);

        let branch_outputs = (0..2 * num_states as u32)
            .map(|register| {
                scheme
                    .polynomials()
                    .iter()
                    .fold(0u8, |acc, &poly| (acc << 1) | parity(register & poly))
            })
            .collect();

        let mut viterbi = Self {
            scheme,
            steps: decision_steps,
            num_states,
            branch_outputs,
            metrics: vec![UNREACHABLE; num_states],
            next_metrics: vec![UNREACHABLE; num_states],
            decisions: vec![0; decision_steps * words_per_step],
            words_per_step,
            accumulated: 0,
        };
        viterbi.init(0);
        viterbi
    }

    /// Branch costs for every R-bit output pattern given one step of received symbols.
    fn pattern_costs(&self, received: &[SoftBit], costs: &mut [u32]) {
        let r = received.len();
        for (pattern, cost) in costs.iter_mut().enumerate() {
            *cost = received
                .iter()
                .enumerate()
                .map(|(i, &sym)| {
                    let expected = if (pattern >> (r - 1 - i)) & 1 != 0 {
                        SOFTBIT_1
                    } else {
                        SOFTBIT_0
                    };
                    u32::from(sym.abs_diff(expected))
                })
                .sum();
        }
    }

    fn decision(&self, step: usize, state: usize) -> usize {
        let word = self.decisions[step * self.words_per_step + state / 64];
        ((word >> (state % 64)) & 1) as usize
    }
}

impl TrellisEngine for Viterbi {
    fn scheme(&self) -> ConvScheme {
        self.scheme
    }

    fn decision_steps(&self) -> usize {
        self.steps
    }

    fn init(&mut self, start_state: usize) {
        self.metrics.fill(UNREACHABLE);
        self.metrics[start_state & (self.num_states - 1)] = 0;
        self.accumulated = 0;
    }

    fn update_block(&mut self, symbols: &[SoftBit], steps: usize) -> Result<()> {
        if steps != self.steps {
            return Err(Error::EngineContract(format!(
                "update_block fed {} steps to an instance sized for {}",
                steps, self.steps
            )));
        }
        let r = self.scheme.rate_denominator();
        if symbols.len() < steps * r {
            return Err(Error::buffer_length("soft symbol", steps * r, symbols.len()));
        }

        let half = self.num_states / 2;
        let mut costs = vec![0u32; 1 << r];

        for (step, received) in symbols.chunks_exact(r).take(steps).enumerate() {
            self.pattern_costs(received, &mut costs);

            let row = &mut self.decisions
                [step * self.words_per_step..(step + 1) * self.words_per_step];
            row.fill(0);

            let mut min_metric = u32::MAX;
            for state in 0..self.num_states {
                let prev = state >> 1;
                let m0 = self.metrics[prev]
                    .saturating_add(costs[self.branch_outputs[state] as usize]);
                let m1 = self.metrics[prev | half]
                    .saturating_add(costs[self.branch_outputs[state | self.num_states] as usize]);

                let metric = if m1 < m0 {
                    row[state / 64] |= 1 << (state % 64);
                    m1
                } else {
                    m0
                };
                self.next_metrics[state] = metric;
                min_metric = min_metric.min(metric);
            }

            for metric in self.next_metrics.iter_mut() {
                *metric -= min_metric;
            }
            std::mem::swap(&mut self.metrics, &mut self.next_metrics);
        }

        self.accumulated = steps;
        Ok(())
    }

    fn chainback(&self, out: &mut [u8], nbits: usize, end_state: usize) -> Result<()> {
        if self.accumulated != self.steps {
            return Err(Error::EngineContract(format!(
                "chainback after {} of {} decision steps",
                self.accumulated, self.steps
            )));
        }
        if nbits > self.steps {
            return Err(Error::EngineContract(format!(
                "chainback of {} bits from a {}-step trellis",
                nbits, self.steps
            )));
        }
        let nbytes = nbits.div_ceil(8);
        if out.len() < nbytes {
            return Err(Error::buffer_length("decoded", nbytes, out.len()));
        }

        let out = &mut out[..nbytes];
        out.fill(0);
        let out_bits = out.view_bits_mut::<Msb0>();

        let half = self.num_states / 2;
        let mut state = end_state & (self.num_states - 1);
        for step in (0..self.steps).rev() {
            if step < nbits && state & 1 != 0 {
                out_bits.set(step, true);
            }
            state = (state >> 1) | (self.decision(step, state) * half);
        }

        Ok(())
    }
}
