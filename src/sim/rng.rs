//! Random draws for spawning
//!
//! The simulation only ever asks for uniform values in [0, 1) and uniform
//! ranges, so the seam is a small trait. `PcgSource` is the seeded default;
//! `FixedSource` and `ScriptedSource` pin draws for reproducible scenarios.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Uniform random draws, reseedable for deterministic replays
pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Restart the sequence from `seed`
    fn reseed(&mut self, seed: u64);

    /// Uniform value in [min, max]; returns `min` for an empty range
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_unit()
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Draws taken since seeding
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Rebuild the generator at the recorded position
    pub fn to_source(&self) -> PcgSource {
        let mut source = PcgSource::new(self.seed);
        for _ in 0..self.draws {
            source.next_unit();
        }
        source
    }
}

/// Seeded PCG32 source
#[derive(Debug, Clone)]
pub struct PcgSource {
    rng: Pcg32,
    state: RngState,
}

impl PcgSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            state: RngState::new(seed),
        }
    }

    pub fn state(&self) -> RngState {
        self.state
    }
}

impl RandomSource for PcgSource {
    fn next_unit(&mut self) -> f32 {
        self.state.draws += 1;
        self.rng.random::<f32>()
    }

    fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }
}

/// Always returns the same value (clamped below 1)
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f32);

impl RandomSource for FixedSource {
    fn next_unit(&mut self) -> f32 {
        self.0.clamp(0.0, 1.0 - f32::EPSILON)
    }

    fn reseed(&mut self, _seed: u64) {}
}

/// Replays a fixed list of draws in a loop
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f32>) -> Self {
        assert!(!values.is_empty(), "scripted source needs at least one value");
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }

    /// Rewinds to the first value; the script itself is the seed
    fn reseed(&mut self, _seed: u64) {
        self.cursor = 0;
    }
}
