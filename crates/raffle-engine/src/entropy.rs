//! # Randomness Sources
//!
//! Winner selection never calls a global RNG. It draws through an
//! [`EntropySource`] handed to it at construction, so deployments choose
//! OS entropy and tests pin the outcome.

use parking_lot::Mutex;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// A source of uniform indices.
pub trait EntropySource: Send + Sync {
    /// Draw an index uniformly from `0..upper`.
    ///
    /// Callers pass `upper > 0`. Implementations return `0` for `upper == 0`
    /// rather than panicking.
    fn draw_index(&self, upper: usize) -> usize;
}

/// Operating-system entropy. The production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn draw_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        OsRng.gen_range(0..upper)
    }
}

/// Deterministic generator seeded once; the same seed replays the same
/// sequence of draws.
#[derive(Debug)]
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    /// Create a generator from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn draw_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..upper)
    }
}

/// Always returns the same index, reduced modulo `upper`.
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy(pub usize);

impl EntropySource for FixedEntropy {
    fn draw_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.0 % upper
    }
}
