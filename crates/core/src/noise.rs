//! Scalar noise and vector force fields.
//!
//! [`NoiseField`] is the sketch-facing `noise(x, y, z)` call: coherent noise
//! with optional octaves, remapped to [0, 1]. [`FieldSource`] implementations
//! produce a 2D vector at any point and time; particle systems sum them as
//! forces.
//!
//! Everything here is deterministic for a given seed.

use glam::DVec2;
use ::noise::{NoiseFn, OpenSimplex, Perlin};

use crate::error::FrescoError;
use crate::field::Field;

/// Linearly remaps `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`.
///
/// The result is not clamped. A zero-width input range maps to `out_lo`.
pub fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    let span = in_hi - in_lo;
    if span.abs() < f64::EPSILON {
        return out_lo;
    }
    out_lo + (value - in_lo) / span * (out_hi - out_lo)
}

/// Gradient noise basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    Perlin,
    Simplex,
}

enum Basis {
    Perlin(Perlin),
    Simplex(OpenSimplex),
}

impl Basis {
    fn get(&self, p: [f64; 3]) -> f64 {
        match self {
            Basis::Perlin(n) => n.get(p),
            Basis::Simplex(n) => n.get(p),
        }
    }
}

/// Fractal noise sampler with output in [0, 1].
///
/// Each octave doubles the frequency and multiplies the amplitude by
/// `falloff`. The octave sum is normalized by the total amplitude before
/// remapping.
pub struct NoiseField {
    basis: Basis,
    octaves: u32,
    falloff: f64,
}

impl NoiseField {
    /// Single-octave Perlin noise.
    pub fn new(seed: u32) -> Self {
        Self::with_kind(NoiseKind::Perlin, seed)
    }

    pub fn with_kind(kind: NoiseKind, seed: u32) -> Self {
        let basis = match kind {
            NoiseKind::Perlin => Basis::Perlin(Perlin::new(seed)),
            NoiseKind::Simplex => Basis::Simplex(OpenSimplex::new(seed)),
        };
        Self {
            basis,
            octaves: 1,
            falloff: 0.5,
        }
    }

    /// Sets octave count (at least 1) and per-octave amplitude falloff.
    pub fn octaves(mut self, octaves: u32, falloff: f64) -> Self {
        self.octaves = octaves.max(1);
        self.falloff = falloff;
        self
    }

    /// Samples at `(x, y, z)`; `z` is usually time.
    pub fn get(&self, x: f64, y: f64, z: f64) -> f64 {
        let (sum, total, _, _) = (0..self.octaves).fold(
            (0.0, 0.0, 1.0, 1.0),
            |(sum, total, amp, freq), _| {
                (
                    sum + self.basis.get([x * freq, y * freq, z * freq]) * amp,
                    total + amp,
                    amp * self.falloff,
                    freq * 2.0,
                )
            },
        );
        let v = if total.abs() < f64::EPSILON { 0.0 } else { sum / total };
        ((v + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Samples at a point.
    pub fn at(&self, p: DVec2, z: f64) -> f64 {
        self.get(p.x, p.y, z)
    }

    /// Rasterizes noise into a field, sampling cell `(x, y)` at `(x, y) * scale`.
    pub fn to_field(
        &self,
        width: usize,
        height: usize,
        scale: f64,
        z: f64,
    ) -> Result<Field, FrescoError> {
        Field::from_fn(width, height, |x, y| {
            self.get(x as f64 * scale, y as f64 * scale, z)
        })
    }
}

/// A 2D vector field sampled in space and time.
pub trait FieldSource: Send + Sync {
    fn sample(&self, p: DVec2, time: f64) -> DVec2;
}

/// Distances below this are treated as coincident.
const SINGULARITY_EPS: f64 = 1e-10;

/// Constant force such as gravity or wind.
pub struct UniformForce(pub DVec2);

/// Curl of a scalar Perlin potential: swirling, approximately
/// divergence-free flow.
pub struct CurlField {
    noise: Perlin,
    scale: f64,
    strength: f64,
}

impl CurlField {
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
        }
    }
}

/// Pull toward (positive strength) or push from (negative) a point with
/// `strength / (1 + d / radius)` falloff.
pub struct PointAttractor {
    pub center: DVec2,
    pub strength: f64,
    pub radius: f64,
}

/// Counter-clockwise swirl around a center with Gaussian falloff.
pub struct Vortex {
    pub center: DVec2,
    pub strength: f64,
    pub radius: f64,
}

/// Flow field steering along a noise-derived angle: the noise value in
/// [0, 1] maps to a heading in [0, 2*pi * turns].
pub struct NoiseFlow {
    noise: NoiseField,
    scale: f64,
    strength: f64,
    turns: f64,
}

impl NoiseFlow {
    pub fn new(noise: NoiseField, scale: f64, strength: f64) -> Self {
        Self {
            noise,
            scale,
            strength,
            turns: 2.0,
        }
    }

    pub fn turns(mut self, turns: f64) -> Self {
        self.turns = turns;
        self
    }
}

/// Jittery force from two decorrelated noise channels folded around zero.
pub struct Turbulence {
    x: NoiseField,
    y: NoiseField,
    scale: f64,
    strength: f64,
}

impl Turbulence {
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            x: NoiseField::new(seed).octaves(3, 0.5),
            y: NoiseField::new(seed.wrapping_add(1)).octaves(3, 0.5),
            scale,
            strength,
        }
    }
}

/// Inverse-square pull toward a mass, softened so the force stays finite
/// near the center.
pub struct GravityWell {
    pub center: DVec2,
    pub mass: f64,
    pub softening: f64,
}

/// Sum of several sources.
#[derive(Default)]
pub struct CompositeField {
    sources: Vec<Box<dyn FieldSource>>,
}

impl CompositeField {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, source: Box<dyn FieldSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn push(&mut self, source: Box<dyn FieldSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FieldSource for UniformForce {
    fn sample(&self, _p: DVec2, _time: f64) -> DVec2 {
        self.0
    }
}

impl FieldSource for CurlField {
    fn sample(&self, p: DVec2, time: f64) -> DVec2 {
        let s = p * self.scale;
        let eps = 1e-3;
        let potential = |x: f64, y: f64| self.noise.get([x, y, time]);
        // curl F = (dF/dy, -dF/dx)
        let df_dy = (potential(s.x, s.y + eps) - potential(s.x, s.y - eps)) / (2.0 * eps);
        let df_dx = (potential(s.x + eps, s.y) - potential(s.x - eps, s.y)) / (2.0 * eps);
        DVec2::new(df_dy, -df_dx) * self.strength
    }
}

impl FieldSource for PointAttractor {
    fn sample(&self, p: DVec2, _time: f64) -> DVec2 {
        let delta = self.center - p;
        let dist = delta.length();
        if dist < SINGULARITY_EPS || self.radius.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        delta / dist * (self.strength / (1.0 + dist / self.radius))
    }
}

impl FieldSource for Vortex {
    fn sample(&self, p: DVec2, _time: f64) -> DVec2 {
        let r = p - self.center;
        let dist_sq = r.length_squared();
        let dist = dist_sq.sqrt();
        if dist < SINGULARITY_EPS || self.radius.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        let falloff = (-dist_sq / (2.0 * self.radius * self.radius)).exp();
        r.perp() / dist * self.strength * falloff
    }
}

impl FieldSource for NoiseFlow {
    fn sample(&self, p: DVec2, time: f64) -> DVec2 {
        let angle = self.noise.at(p * self.scale, time) * std::f64::consts::TAU * self.turns;
        DVec2::from_angle(angle) * self.strength
    }
}

impl FieldSource for Turbulence {
    fn sample(&self, p: DVec2, time: f64) -> DVec2 {
        let s = p * self.scale;
        let fold = |v: f64| (v - 0.5) * 2.0;
        DVec2::new(fold(self.x.at(s, time)), fold(self.y.at(s, time))) * self.strength
    }
}

impl FieldSource for GravityWell {
    fn sample(&self, p: DVec2, _time: f64) -> DVec2 {
        let delta = self.center - p;
        let dist_sq = delta.length_squared();
        if dist_sq < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        let soft = dist_sq + self.softening * self.softening;
        delta / dist_sq.sqrt() * (self.mass / soft)
    }
}

impl FieldSource for CompositeField {
    fn sample(&self, p: DVec2, time: f64) -> DVec2 {
        self.sources
            .iter()
            .fold(DVec2::ZERO, |acc, s| acc + s.sample(p, time))
    }
}
