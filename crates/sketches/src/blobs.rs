//! Soft-body blobs dropping into the frame and piling up.

use fresco_core::params::{param_f64_in, param_range_in, param_string, param_usize_in};
use fresco_core::{DVec2, FrescoError, Palette, Rgba, Shape, Xorshift64};
use fresco_particles::{collide_bodies, Bounds, SoftBody};
use serde_json::{json, Value};

use crate::palette_param;
use crate::raster::Raster;
use crate::sketch::Sketch;

const DEFAULT_COUNT: usize = 6;
const DEFAULT_RADIUS: (f64, f64) = (0.08, 0.16);
const DEFAULT_RESOLUTION: usize = 24;
const DEFAULT_GRAVITY: f64 = 0.08;
const DEFAULT_DRAG: f64 = 0.02;
const DEFAULT_RESTITUTION: f64 = 0.3;
const DEFAULT_PRESSURE: f64 = 1.0;
const DEFAULT_STIFFNESS: f64 = 0.3;
const DEFAULT_PALETTE: &str = "ocean";
/// Chaikin passes applied to outlines before filling.
const DISPLAY_SMOOTHING: usize = 2;

#[derive(Debug, Clone)]
pub struct BlobsParams {
    pub count: usize,
    /// Blob radius range as a fraction of the shorter canvas side.
    pub radius: (f64, f64),
    pub resolution: usize,
    pub gravity: f64,
    pub drag: f64,
    pub restitution: f64,
    pub pressure: f64,
    pub stiffness: f64,
    pub palette: String,
}

impl Default for BlobsParams {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl BlobsParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            count: param_usize_in(params, "count", DEFAULT_COUNT, 1, 64),
            radius: param_range_in(params, "radius", DEFAULT_RADIUS, 0.01, 0.5),
            resolution: param_usize_in(params, "resolution", DEFAULT_RESOLUTION, 3, 256),
            gravity: param_f64_in(params, "gravity", DEFAULT_GRAVITY, -1.0, 1.0),
            drag: param_f64_in(params, "drag", DEFAULT_DRAG, 0.0, 1.0),
            restitution: param_f64_in(params, "restitution", DEFAULT_RESTITUTION, 0.0, 1.0),
            pressure: param_f64_in(params, "pressure", DEFAULT_PRESSURE, 0.0, 10.0),
            stiffness: param_f64_in(params, "stiffness", DEFAULT_STIFFNESS, 0.0, 2.0),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

pub struct Blobs {
    params: BlobsParams,
    palette: Palette,
    bodies: Vec<SoftBody>,
    bounds: Bounds,
}

impl Blobs {
    /// Blobs start spread across the upper part of the canvas, staggered in
    /// height so they arrive one after another.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: BlobsParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        let (w, h) = (width as f64, height as f64);
        let side = w.min(h);
        let mut rng = Xorshift64::new(seed);

        let bodies = (0..params.count)
            .map(|i| {
                let radius = (side * rng.next_range(params.radius.0, params.radius.1)).max(2.0);
                let x = rng.next_range(radius, (w - radius).max(radius));
                let y = radius - i as f64 * radius * 1.5;
                let mut body = SoftBody::new(DVec2::new(x, y), radius, params.resolution)?;
                body.pressure = params.pressure;
                body.stiffness = params.stiffness;
                body.push(DVec2::new(rng.next_range(-1.0, 1.0), 0.0));
                Ok(body)
            })
            .collect::<Result<Vec<_>, FrescoError>>()?;

        Ok(Self {
            params,
            palette,
            bodies,
            // open at the top so late blobs can fall in
            bounds: Bounds::Bounce {
                min: DVec2::new(0.0, f64::NEG_INFINITY),
                max: DVec2::new(w, h),
                restitution: 0.4,
            },
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, BlobsParams::from_json(params))
    }

    pub fn bodies(&self) -> &[SoftBody] {
        &self.bodies
    }

    fn tone(&self, index: usize) -> f64 {
        if self.bodies.len() < 2 {
            return 0.6;
        }
        0.3 + 0.7 * index as f64 / (self.bodies.len() - 1) as f64
    }
}

impl Sketch for Blobs {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(Rgba::from(self.palette.sample(0.0)));
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        let gravity = DVec2::new(0.0, self.params.gravity);
        for body in &mut self.bodies {
            body.step(gravity, 1.0, self.params.drag, &self.bounds);
        }
        collide_bodies(&mut self.bodies, self.params.restitution);
        // contacts can push nodes through the walls
        for body in &mut self.bodies {
            for node in body.nodes_mut() {
                self.bounds.apply(node);
            }
        }

        raster.background(Rgba::from(self.palette.sample(0.0)));
        for (i, body) in self.bodies.iter().enumerate() {
            let outline = body.shape().smooth(DISPLAY_SMOOTHING);
            let tone = self.tone(i);
            raster.fill_shape(&outline, self.palette.rgba(tone, 0.9));
            raster.stroke_shape(&outline, self.palette.rgba(tone * 0.5, 1.0), 1.5);
        }
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        self.bodies.iter().map(SoftBody::shape).collect()
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "count": p.count,
            "radius": [p.radius.0, p.radius.1],
            "resolution": p.resolution,
            "gravity": p.gravity,
            "drag": p.drag,
            "restitution": p.restitution,
            "pressure": p.pressure,
            "stiffness": p.stiffness,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 1,
                "max": 64,
                "description": "Number of blobs"
            },
            "radius": {
                "type": "range",
                "default": [DEFAULT_RADIUS.0, DEFAULT_RADIUS.1],
                "min": 0.01,
                "max": 0.5,
                "description": "Blob radius range as a fraction of the shorter canvas side"
            },
            "resolution": {
                "type": "integer",
                "default": DEFAULT_RESOLUTION,
                "min": 3,
                "max": 256,
                "description": "Nodes per blob outline"
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
            "restitution": {
                "type": "number",
                "default": DEFAULT_RESTITUTION,
                "min": 0.0,
                "max": 1.0,
                "description": "Bounciness of blob-to-blob contacts"
            },
            "pressure": {
                "type": "number",
                "default": DEFAULT_PRESSURE,
                "min": 0.0,
                "max": 10.0,
                "description": "How strongly blobs recover their area"
            },
            "stiffness": {
                "type": "number",
                "default": DEFAULT_STIFFNESS,
                "min": 0.0,
                "max": 2.0,
                "description": "Spring stiffness of the outline"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }
}
