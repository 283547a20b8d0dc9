//! Seeded random stream shared by generation and agent decisions.
//! This module exists so every consumer draws numbers through the same deterministic helpers.
//! It does not own seed derivation policy; see `mapgen::seed` for that.

use std::fmt;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

#[derive(Clone)]
pub struct LevelRng {
    inner: ChaCha8Rng,
}

impl LevelRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform value in `0..bound`. A zero bound yields zero without drawing.
    pub fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }

    pub fn coin(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// Uniform value in `[0, 1)` built from the top 53 bits of one draw.
    pub fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    pub fn heading(&mut self) -> f64 {
        self.unit() * 360.0
    }
}

impl fmt::Debug for LevelRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LevelRng")
    }
}
