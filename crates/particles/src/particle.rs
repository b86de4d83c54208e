//! A single point mass with a finite lifespan.

use glam::DVec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub mass: f64,
    /// Time lived so far, in simulation time units.
    pub age: f64,
    /// Age at which the particle dies. `f64::INFINITY` never dies.
    pub lifespan: f64,
    force: DVec2,
}

impl Particle {
    /// Mass defaults to 1.
    pub fn new(position: DVec2, velocity: DVec2, radius: f64, lifespan: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
            mass: 1.0,
            age: 0.0,
            lifespan,
            force: DVec2::ZERO,
        }
    }

    /// An immortal particle at rest.
    pub fn at_rest(position: DVec2, radius: f64) -> Self {
        Self::new(position, DVec2::ZERO, radius, f64::INFINITY)
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Accumulates a force for the next [`Particle::update`].
    pub fn apply_force(&mut self, force: DVec2) {
        self.force += force;
    }

    pub fn force(&self) -> DVec2 {
        self.force
    }

    /// Semi-implicit Euler step. `drag` in [0, 1] is the fraction of velocity
    /// lost per unit time. The force accumulator is cleared.
    pub fn update(&mut self, dt: f64, drag: f64) {
        let inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
        self.velocity += self.force * inv_mass * dt;
        self.velocity *= (1.0 - drag * dt).clamp(0.0, 1.0);
        self.position += self.velocity * dt;
        self.force = DVec2::ZERO;
        self.age += dt;
    }

    pub fn is_dead(&self) -> bool {
        self.age >= self.lifespan
    }

    /// Remaining life in [0, 1]: 1 at birth, 0 at death. Immortal particles stay at 1.
    pub fn life_remaining(&self) -> f64 {
        if self.lifespan.is_infinite() {
            return 1.0;
        }
        if self.lifespan <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifespan).clamp(0.0, 1.0)
    }
}
