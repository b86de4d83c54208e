//! Deterministic PRNG for reproducible sketches.
//!
//! Every random decision a sketch makes (emitter jitter, site placement,
//! pottery profile) goes through [`Xorshift64`], so a given seed always
//! renders the same composition on every platform.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Xorshift64 generator with shifts (13, 7, 17).
///
/// A seed of 0 is replaced with a non-zero fallback because zero is a fixed
/// point of the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Derives an independent generator, e.g. one per emitter.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u64())
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max). Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    /// Uniform usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Returns `true` with probability `p` (clamped to [0, 1]).
    pub fn next_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Normally distributed sample via the Box-Muller transform.
    pub fn next_gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + z * std_dev
    }

    /// Uniform angle in radians in [0, 2π).
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    /// Unit-length vector with uniformly distributed direction.
    pub fn next_unit_vector(&mut self) -> DVec2 {
        DVec2::from_angle(self.next_angle())
    }

    /// Uniformly distributed point inside a disc of `radius` centred at the origin.
    pub fn next_in_circle(&mut self, radius: f64) -> DVec2 {
        let r = radius * self.next_f64().sqrt();
        self.next_unit_vector() * r
    }
}
