//! Particle system: emitters, forces, collisions and boundaries.

use fresco_core::noise::CompositeField;
use fresco_core::{FieldSource, Xorshift64};
use glam::DVec2;

use crate::emitter::Emitter;
use crate::particle::Particle;
use crate::spatial_hash::SpatialHash;

/// What happens to particles that leave the simulation rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// No boundary.
    Open,
    /// Reflect off the walls, scaling the normal velocity by `restitution`.
    Bounce {
        min: DVec2,
        max: DVec2,
        restitution: f64,
    },
    /// Re-enter from the opposite side.
    Wrap { min: DVec2, max: DVec2 },
    /// Remove on exit.
    Kill { min: DVec2, max: DVec2 },
}

impl Bounds {
    /// `Bounce` over `[0, width] x [0, height]`.
    pub fn bounce(width: f64, height: f64, restitution: f64) -> Self {
        Bounds::Bounce {
            min: DVec2::ZERO,
            max: DVec2::new(width, height),
            restitution,
        }
    }

    /// Applies the boundary to one particle. `Kill` marks it dead.
    pub fn apply(&self, p: &mut Particle) {
        match *self {
            Bounds::Open => {}
            Bounds::Bounce {
                min,
                max,
                restitution,
            } => {
                // keep the whole disc inside when it fits
                let lo = (min + DVec2::splat(p.radius)).min(max);
                let hi = (max - DVec2::splat(p.radius)).max(lo);
                if p.position.x < lo.x {
                    p.position.x = lo.x;
                    p.velocity.x = p.velocity.x.abs() * restitution;
                } else if p.position.x > hi.x {
                    p.position.x = hi.x;
                    p.velocity.x = -p.velocity.x.abs() * restitution;
                }
                if p.position.y < lo.y {
                    p.position.y = lo.y;
                    p.velocity.y = p.velocity.y.abs() * restitution;
                } else if p.position.y > hi.y {
                    p.position.y = hi.y;
                    p.velocity.y = -p.velocity.y.abs() * restitution;
                }
            }
            Bounds::Wrap { min, max } => {
                let size = max - min;
                if size.x > 0.0 {
                    p.position.x = min.x + (p.position.x - min.x).rem_euclid(size.x);
                }
                if size.y > 0.0 {
                    p.position.y = min.y + (p.position.y - min.y).rem_euclid(size.y);
                }
            }
            Bounds::Kill { min, max } => {
                let inside = p.position.cmpge(min).all() && p.position.cmple(max).all();
                if !inside {
                    p.age = p.lifespan.max(p.age);
                }
            }
        }
    }
}

/// A set of particles advanced in fixed steps.
///
/// Each [`ParticleSystem::step`] runs, in order: emission (stopping at
/// `max_particles`), gravity and field forces, integration, pairwise
/// collisions, boundary handling, then removal of dead particles.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    emitters: Vec<Emitter>,
    forces: CompositeField,
    /// Acceleration applied to every particle, scaled by its mass.
    pub gravity: DVec2,
    pub drag: f64,
    pub dt: f64,
    pub bounds: Bounds,
    /// Restitution of particle-particle contacts; `None` disables collisions.
    pub collisions: Option<f64>,
    max_particles: usize,
    time: f64,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            emitters: Vec::new(),
            forces: CompositeField::new(),
            gravity: DVec2::ZERO,
            drag: 0.0,
            dt: 1.0,
            bounds: Bounds::Open,
            collisions: None,
            max_particles,
            time: 0.0,
        }
    }

    pub fn with_gravity(mut self, gravity: DVec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_drag(mut self, drag: f64) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_collisions(mut self, restitution: f64) -> Self {
        self.collisions = Some(restitution);
        self
    }

    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    pub fn add_force(&mut self, source: Box<dyn FieldSource>) {
        self.forces.push(source);
    }

    /// Adds a particle unless the system is full. Returns whether it was added.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        self.particles.push(particle);
        true
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&mut self, rng: &mut Xorshift64) {
        self.emit(rng);

        for p in &mut self.particles {
            let force = self.gravity * p.mass + self.forces.sample(p.position, self.time);
            p.apply_force(force);
            p.update(self.dt, self.drag);
        }

        if let Some(restitution) = self.collisions {
            resolve_collisions(&mut self.particles, restitution);
        }

        let bounds = self.bounds;
        for p in &mut self.particles {
            bounds.apply(p);
        }

        let before = self.particles.len();
        self.particles.retain(|p| !p.is_dead());
        let culled = before - self.particles.len();
        if culled > 0 {
            log::trace!("culled {culled} particles, {} alive", self.particles.len());
        }
        self.time += self.dt;
    }

    fn emit(&mut self, rng: &mut Xorshift64) {
        for emitter in &mut self.emitters {
            let room = self.max_particles.saturating_sub(self.particles.len());
            self.particles.extend(emitter.emit_up_to(room, rng));
        }
    }
}

/// Separates overlapping discs and exchanges momentum along the contact normal.
fn resolve_collisions(particles: &mut [Particle], restitution: f64) {
    let max_radius = particles.iter().map(|p| p.radius).fold(0.0, f64::max);
    if max_radius <= 0.0 {
        return;
    }
    let positions: Vec<DVec2> = particles.iter().map(|p| p.position).collect();
    let hash = SpatialHash::build(2.0 * max_radius, &positions);

    for i in 0..particles.len() {
        for j in hash.near(positions[i]).filter(|&j| j > i) {
            let (a, b) = pair_mut(particles, i, j);
            resolve_contact(a, b, restitution);
        }
    }
}

/// Resolves one disc-disc contact. Returns whether the discs overlapped.
pub(crate) fn resolve_contact(a: &mut Particle, b: &mut Particle, restitution: f64) -> bool {
    let delta = b.position - a.position;
    let dist = delta.length();
    let reach = a.radius + b.radius;
    if dist >= reach {
        return false;
    }
    let normal = if dist > 1e-9 { delta / dist } else { DVec2::X };
    let inv_a = if a.mass > 0.0 { 1.0 / a.mass } else { 0.0 };
    let inv_b = if b.mass > 0.0 { 1.0 / b.mass } else { 0.0 };
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return false;
    }

    let correction = normal * (reach - dist) / inv_sum;
    a.position -= correction * inv_a;
    b.position += correction * inv_b;

    let closing = (b.velocity - a.velocity).dot(normal);
    if closing < 0.0 {
        let impulse = normal * (-(1.0 + restitution) * closing / inv_sum);
        a.velocity -= impulse * inv_a;
        b.velocity += impulse * inv_b;
    }
    true
}

/// Mutable references to two distinct elements, `i < j`.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
