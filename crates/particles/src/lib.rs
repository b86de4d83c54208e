#![deny(unsafe_code)]
//! Particle simulation for fresco sketches.
//!
//! [`Particle`]s are spawned by [`Emitter`]s into a [`ParticleSystem`], which
//! applies gravity and [`fresco_core::FieldSource`] forces, resolves collisions
//! through a [`SpatialHash`] and enforces [`Bounds`]. [`SoftBody`] builds
//! pressure blobs out of the same particles.

pub mod emitter;
pub mod particle;
pub mod soft_body;
pub mod spatial_hash;
pub mod system;

pub use emitter::Emitter;
pub use particle::Particle;
pub use soft_body::{collide_bodies, SoftBody};
pub use spatial_hash::SpatialHash;
pub use system::{Bounds, ParticleSystem};
