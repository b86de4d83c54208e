//! Particle fountain with glowing trails.
//!
//! An emitter at the bottom centre fires particles upward in a cone. Gravity
//! pulls them back down, an optional wind and turbulence push them sideways,
//! and each frame washes the canvas with a translucent background so the
//! additive-blended particles leave fading trails.

use std::f64::consts::{FRAC_PI_2, TAU};

use fresco_core::noise::{Turbulence, UniformForce};
use fresco_core::params::{
    param_bool, param_f64, param_f64_in, param_range_in, param_string, param_usize_in,
};
use fresco_core::{DVec2, FrescoError, Palette, Rgba, Shape, Xorshift64};
use fresco_particles::{Bounds, Emitter, ParticleSystem};
use serde_json::{json, Value};

use crate::raster::{BlendMode, Raster};
use crate::sketch::Sketch;
use crate::{noise_seed, palette_param};

const DEFAULT_RATE: f64 = 4.0;
const DEFAULT_SPREAD: f64 = 0.5;
const DEFAULT_SPEED: (f64, f64) = (4.0, 8.0);
const DEFAULT_LIFESPAN: (f64, f64) = (60.0, 140.0);
const DEFAULT_RADIUS: (f64, f64) = (1.0, 3.0);
const DEFAULT_GRAVITY: f64 = 0.12;
const DEFAULT_DRAG: f64 = 0.005;
const DEFAULT_WIND: f64 = 0.0;
const DEFAULT_TURBULENCE: f64 = 0.0;
const DEFAULT_MAX_PARTICLES: usize = 2000;
const MAX_PARTICLES_LIMIT: usize = 100_000;
const DEFAULT_FADE: f64 = 0.08;
const DEFAULT_BOUNCE: bool = false;
const DEFAULT_PALETTE: &str = "sunset";
/// Vertex count of particle outlines in [`Sketch::shapes`].
const OUTLINE_RESOLUTION: usize = 8;

#[derive(Debug, Clone)]
pub struct FountainParams {
    /// Particles emitted per frame.
    pub rate: f64,
    pub spread: f64,
    pub speed: (f64, f64),
    pub lifespan: (f64, f64),
    pub radius: (f64, f64),
    pub gravity: f64,
    pub drag: f64,
    pub wind: f64,
    pub turbulence: f64,
    pub max_particles: usize,
    pub fade: f64,
    /// Bounce off the canvas edges instead of dying below the floor.
    pub bounce: bool,
    pub palette: String,
}

impl Default for FountainParams {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl FountainParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            rate: param_f64_in(params, "rate", DEFAULT_RATE, 0.0, 50.0),
            spread: param_f64(params, "spread", DEFAULT_SPREAD).abs().min(TAU),
            speed: param_range_in(params, "speed", DEFAULT_SPEED, 0.0, 50.0),
            lifespan: param_range_in(params, "lifespan", DEFAULT_LIFESPAN, 1.0, 100_000.0),
            radius: param_range_in(params, "radius", DEFAULT_RADIUS, 0.0, 50.0),
            gravity: param_f64_in(params, "gravity", DEFAULT_GRAVITY, -1.0, 1.0),
            drag: param_f64_in(params, "drag", DEFAULT_DRAG, 0.0, 1.0),
            wind: param_f64_in(params, "wind", DEFAULT_WIND, -1.0, 1.0),
            turbulence: param_f64_in(params, "turbulence", DEFAULT_TURBULENCE, 0.0, 1.0),
            max_particles: param_usize_in(
                params,
                "max_particles",
                DEFAULT_MAX_PARTICLES,
                0,
                MAX_PARTICLES_LIMIT,
            ),
            fade: param_f64_in(params, "fade", DEFAULT_FADE, 0.0, 1.0),
            bounce: param_bool(params, "bounce", DEFAULT_BOUNCE),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

pub struct Fountain {
    params: FountainParams,
    palette: Palette,
    system: ParticleSystem,
    rng: Xorshift64,
}

impl Fountain {
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: FountainParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        let (w, h) = (width as f64, height as f64);

        let bounds = if params.bounce {
            Bounds::bounce(w, h, 0.6)
        } else {
            // particles may arc above the top edge and come back
            Bounds::Kill {
                min: DVec2::new(-w * 0.5, -h * 4.0),
                max: DVec2::new(w * 1.5, h + params.radius.1),
            }
        };
        let mut system = ParticleSystem::new(params.max_particles)
            .with_gravity(DVec2::new(0.0, params.gravity))
            .with_drag(params.drag)
            .with_bounds(bounds);
        system.add_emitter(
            Emitter::new(DVec2::new(w * 0.5, h - 2.0), -FRAC_PI_2)
                .with_spread(params.spread)
                .with_speed(params.speed.0, params.speed.1)
                .with_lifespan(params.lifespan.0, params.lifespan.1)
                .with_radius(params.radius.0, params.radius.1)
                .with_rate(params.rate),
        );
        if params.wind != 0.0 {
            system.add_force(Box::new(UniformForce(DVec2::new(params.wind, 0.0))));
        }
        if params.turbulence > 0.0 {
            system.add_force(Box::new(Turbulence::new(0.01, params.turbulence, noise_seed(seed))));
        }

        Ok(Self {
            params,
            palette,
            system,
            rng: Xorshift64::new(seed),
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, FountainParams::from_json(params))
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }
}

impl Sketch for Fountain {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(Rgba::from(self.palette.sample(0.0)));
        raster.blend = BlendMode::Additive;
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.fade(self.palette.rgba(0.0, self.params.fade));
        self.system.step(&mut self.rng);
        for p in self.system.particles() {
            let life = p.life_remaining();
            // young particles take the hot end of the palette
            let color = self.palette.rgba(0.25 + 0.75 * life, 0.15 + 0.45 * life);
            raster.fill_circle(p.position, p.radius * (0.4 + 0.6 * life), color);
        }
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        self.system
            .particles()
            .iter()
            .filter_map(|p| Shape::circle(p.position, p.radius, OUTLINE_RESOLUTION).ok())
            .collect()
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "rate": p.rate,
            "spread": p.spread,
            "speed": [p.speed.0, p.speed.1],
            "lifespan": [p.lifespan.0, p.lifespan.1],
            "radius": [p.radius.0, p.radius.1],
            "gravity": p.gravity,
            "drag": p.drag,
            "wind": p.wind,
            "turbulence": p.turbulence,
            "max_particles": p.max_particles,
            "fade": p.fade,
            "bounce": p.bounce,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "rate": {
                "type": "number",
                "default": DEFAULT_RATE,
                "min": 0.0,
                "max": 50.0,
                "description": "Particles emitted per frame (fractions accumulate)"
            },
            "spread": {
                "type": "number",
                "default": DEFAULT_SPREAD,
                "min": 0.0,
                "max": TAU,
                "description": "Emission cone angle in radians"
            },
            "speed": {
                "type": "range",
                "default": [DEFAULT_SPEED.0, DEFAULT_SPEED.1],
                "min": 0.0,
                "max": 50.0,
                "description": "Launch speed range in pixels per frame"
            },
            "lifespan": {
                "type": "range",
                "default": [DEFAULT_LIFESPAN.0, DEFAULT_LIFESPAN.1],
                "min": 1.0,
                "max": 100000.0,
                "description": "Particle lifespan range in frames"
            },
            "radius": {
                "type": "range",
                "default": [DEFAULT_RADIUS.0, DEFAULT_RADIUS.1],
                "min": 0.0,
                "max": 50.0,
                "description": "Particle radius range in pixels"
            },
            "gravity": {
                "type": "number",
                "default": DEFAULT_GRAVITY,
                "min": -1.0,
                "max": 1.0,
                "description": "Downward acceleration per frame"
            },
            "drag": {
                "type": "number",
                "default": DEFAULT_DRAG,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of velocity lost per frame"
            },
            "wind": {
                "type": "number",
                "default": DEFAULT_WIND,
                "min": -1.0,
                "max": 1.0,
                "description": "Constant horizontal force"
            },
            "turbulence": {
                "type": "number",
                "default": DEFAULT_TURBULENCE,
                "min": 0.0,
                "max": 1.0,
                "description": "Strength of the noise turbulence force"
            },
            "max_particles": {
                "type": "integer",
                "default": DEFAULT_MAX_PARTICLES,
                "min": 0,
                "max": MAX_PARTICLES_LIMIT,
                "description": "Population cap; emission pauses when reached"
            },
            "fade": {
                "type": "number",
                "default": DEFAULT_FADE,
                "min": 0.0,
                "max": 1.0,
                "description": "Background wash alpha per frame (lower = longer trails)"
            },
            "bounce": {
                "type": "boolean",
                "default": DEFAULT_BOUNCE,
                "description": "Bounce off canvas edges instead of dying below the floor"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host;

    #[test]
    fn params_from_json_and_defaults() {
        let p = FountainParams::from_json(&json!({"rate": 2, "speed": [9.0, 3.0], "bounce": true}));
        assert_eq!(p.rate, 2.0);
        assert_eq!(p.speed, (3.0, 9.0));
        assert!(p.bounce);
        let d = FountainParams::default();
        assert_eq!(d.max_particles, DEFAULT_MAX_PARTICLES);
        assert_eq!(d.lifespan, DEFAULT_LIFESPAN);
    }

    #[test]
    fn particles_rise_from_the_bottom() {
        let mut s = Fountain::from_json(100, 100, 1, &json!({"rate": 10})).unwrap();
        let mut raster = Raster::new(100, 100).unwrap();
        host::run(&mut s, &mut raster, 5).unwrap();
        assert!(!s.system().is_empty());
        let mean_y = s.system().particles().iter().map(|p| p.position.y).sum::<f64>()
            / s.system().len() as f64;
        assert!(mean_y < 98.0, "mean y {mean_y}");
        let background = raster.luminance(0, 0);
        let brightest = (0..98)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .map(|(x, y)| raster.luminance(x, y))
            .fold(0.0, f64::max);
        assert!(brightest > background + 0.05);
    }

    #[test]
    fn population_respects_cap() {
        let params = json!({"rate": 30, "max_particles": 50});
        let mut s = Fountain::from_json(80, 80, 4, &params).unwrap();
        let mut raster = Raster::new(80, 80).unwrap();
        s.setup(&mut raster).unwrap();
        for _ in 0..20 {
            s.draw(&mut raster).unwrap();
            assert!(s.system().len() <= 50);
        }
    }

    #[test]
    fn huge_rate_is_clamped_and_capped() {
        let params = json!({"rate": 1e20, "max_particles": 10});
        let mut s = Fountain::from_json(40, 40, 1, &params).unwrap();
        assert_eq!(s.params()["rate"], 50.0);
        let mut raster = Raster::new(40, 40).unwrap();
        host::run(&mut s, &mut raster, 3).unwrap();
        assert!(s.system().len() <= 10);
    }

    #[test]
    fn out_of_range_params_are_clamped() {
        let params = json!({
            "max_particles": 1_000_000_000_000u64,
            "speed": [-5.0, 1e9],
            "lifespan": [0.0, 1e12],
            "gravity": -40.0,
            "spread": 100.0,
        });
        let p = Fountain::from_json(40, 40, 1, &params).unwrap().params();
        assert_eq!(p["max_particles"], 100_000);
        assert_eq!(p["speed"], json!([0.0, 50.0]));
        assert_eq!(p["lifespan"], json!([1.0, 100000.0]));
        assert_eq!(p["gravity"], -1.0);
        assert_eq!(p["spread"], TAU);
    }

    #[test]
    fn particles_die_below_the_floor() {
        let params = json!({
            "rate": 5,
            "speed": [0.5, 1.0],
            "lifespan": [10000.0, 10001.0],
            "gravity": 0.5,
        });
        let mut s = Fountain::from_json(60, 60, 2, &params).unwrap();
        let mut raster = Raster::new(60, 60).unwrap();
        s.setup(&mut raster).unwrap();
        for _ in 0..3 {
            s.draw(&mut raster).unwrap();
        }
        s.system.emitters_mut()[0].rate = 0.0;
        for _ in 0..60 {
            s.draw(&mut raster).unwrap();
        }
        assert!(s.system().is_empty());
    }

    #[test]
    fn bounce_keeps_particles_on_canvas() {
        let params = json!({"bounce": true, "lifespan": [10000.0, 10001.0], "spread": 3.0});
        let mut s = Fountain::from_json(60, 60, 8, &params).unwrap();
        let mut raster = Raster::new(60, 60).unwrap();
        host::run(&mut s, &mut raster, 80).unwrap();
        for p in s.system().particles() {
            assert!((0.0..=60.0).contains(&p.position.x) && (0.0..=60.0).contains(&p.position.y));
        }
    }

    #[test]
    fn uses_additive_blending() {
        let mut s = Fountain::from_json(20, 20, 1, &json!({})).unwrap();
        let mut raster = Raster::new(20, 20).unwrap();
        s.setup(&mut raster).unwrap();
        assert_eq!(raster.blend, BlendMode::Additive);
    }
}
