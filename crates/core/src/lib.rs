#![deny(unsafe_code)]
//! Core toolkit for fresco sketches.
//!
//! Provides the geometry and sampling primitives sketches are built from:
//! vertex [`Shape`]s with resampling/smoothing/relaxation, coherent
//! [`NoiseField`] sampling and vector [`FieldSource`]s, [`Voronoi`] lookup,
//! colors and [`Palette`]s, the [`Xorshift64`] PRNG, scalar [`Field`] grids,
//! SVG export, and the reproducible [`Seed`] description.

pub mod color;
pub mod error;
pub mod field;
pub mod noise;
pub mod palette;
pub mod params;
pub mod prng;
pub mod seed;
pub mod shape;
pub mod svg;
pub mod voronoi;

pub use color::{OkLch, Rgba, Srgb};
pub use error::FrescoError;
pub use field::Field;
pub use crate::noise::{FieldSource, NoiseField};
pub use palette::Palette;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use shape::Shape;
pub use voronoi::Voronoi;

pub use glam::DVec2;
