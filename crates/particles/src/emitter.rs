//! Particle emitters.
//!
//! An [`Emitter`] spawns particles from an origin in a cone around
//! `direction`, sampling speed, lifespan and radius uniformly from their
//! ranges. Fractional rates carry over between steps, so a rate of 0.25
//! emits one particle every fourth step.

use fresco_core::Xorshift64;
use glam::DVec2;

use crate::particle::Particle;

#[derive(Debug, Clone)]
pub struct Emitter {
    pub origin: DVec2,
    /// Emission direction in radians.
    pub direction: f64,
    /// Full cone angle in radians around `direction`.
    pub spread: f64,
    pub speed: (f64, f64),
    pub lifespan: (f64, f64),
    pub radius: (f64, f64),
    /// Particles per step.
    pub rate: f64,
    pending: f64,
}

impl Emitter {
    /// Emitter at `origin` firing along `direction` with a narrow default cone.
    pub fn new(origin: DVec2, direction: f64) -> Self {
        Self {
            origin,
            direction,
            spread: 0.3,
            speed: (1.0, 2.0),
            lifespan: (60.0, 120.0),
            radius: (1.0, 3.0),
            rate: 1.0,
            pending: 0.0,
        }
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread.abs();
        self
    }

    pub fn with_speed(mut self, lo: f64, hi: f64) -> Self {
        self.speed = (lo, hi);
        self
    }

    pub fn with_lifespan(mut self, lo: f64, hi: f64) -> Self {
        self.lifespan = (lo, hi);
        self
    }

    pub fn with_radius(mut self, lo: f64, hi: f64) -> Self {
        self.radius = (lo, hi);
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate.max(0.0);
        self
    }

    /// Number of particles the next [`Emitter::emit`] call will produce.
    pub fn due(&self) -> usize {
        (self.pending + self.rate).floor() as usize
    }

    /// Emits this step's particles.
    pub fn emit(&mut self, rng: &mut Xorshift64) -> Vec<Particle> {
        self.emit_up_to(usize::MAX, rng)
    }

    /// Emits this step's particles, at most `room` of them. The rate
    /// accumulator advances as for [`Emitter::emit`]; particles beyond
    /// `room` are dropped, not carried over.
    pub fn emit_up_to(&mut self, room: usize, rng: &mut Xorshift64) -> Vec<Particle> {
        self.pending += self.rate;
        let count = self.pending.floor();
        self.pending -= count;
        // float to int casts saturate
        self.burst((count as usize).min(room), rng)
    }

    /// Emits `count` particles immediately, independent of the rate.
    pub fn burst(&self, count: usize, rng: &mut Xorshift64) -> Vec<Particle> {
        (0..count).map(|_| self.spawn(rng)).collect()
    }

    fn spawn(&self, rng: &mut Xorshift64) -> Particle {
        let half = self.spread * 0.5;
        let angle = rng.next_range(self.direction - half, self.direction + half);
        let speed = rng.next_range(self.speed.0, self.speed.1);
        let lifespan = rng.next_range(self.lifespan.0, self.lifespan.1);
        let radius = rng.next_range(self.radius.0, self.radius.1);
        Particle::new(self.origin, DVec2::from_angle(angle) * speed, radius, lifespan)
    }
}
