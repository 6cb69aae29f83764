//! Injectable randomness.
//!
//! All stochastic choices in the engine go through [`RandomSource`] so tests
//! can force or suppress spontaneous firing and pulse spawning with fixed
//! sequences. Production uses [`EntropySource`] over a `rand` generator.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform draws in `[0, 1)` plus the derived helpers the engine uses.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// True with probability `p`.
    #[inline]
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform sample in `[lo, hi)`.
    #[inline]
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[inline]
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f64) as usize).min(len - 1)
    }
}

/// `RandomSource` backed by any `rand` generator.
#[derive(Clone, Debug)]
pub struct EntropySource<R: Rng = StdRng>(pub R);

impl EntropySource<StdRng> {
    /// OS-seeded generator for live animation.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible generator, for headless runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for EntropySource<R> {
    #[inline]
    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Always returns the same sample.
///
/// `FixedRandom(0.5)` suppresses every low-probability event;
/// `FixedRandom(0.05)` lets spawns through while keeping spontaneous firing off.
#[derive(Clone, Copy, Debug)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    #[inline]
    fn unit(&mut self) -> f64 {
        self.0
    }
}

/// Plays back a script of samples, then repeats `fallback` forever.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    script: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Samples not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
