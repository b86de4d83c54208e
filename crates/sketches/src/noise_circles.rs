//! Concentric rings wobbling in animated noise.
//!
//! Each ring starts as a coarse circle, is resampled to the full resolution,
//! pushed in and out along its radius by 3D noise (the third axis is time),
//! then lightly relaxed so neighbouring vertices do not kink.

use fresco_core::params::{param_f64_in, param_string, param_usize_in};
use fresco_core::{DVec2, FrescoError, NoiseField, Palette, Rgba, Shape};
use serde_json::{json, Value};

use crate::raster::Raster;
use crate::sketch::Sketch;
use crate::{noise_seed, palette_param};

const DEFAULT_RINGS: usize = 12;
const DEFAULT_RESOLUTION: usize = 180;
/// Displacement as a fraction of the ring spacing.
const DEFAULT_AMOUNT: f64 = 1.5;
const DEFAULT_NOISE_SCALE: f64 = 0.008;
const DEFAULT_SPEED: f64 = 0.01;
const DEFAULT_STROKE: f64 = 1.5;
const DEFAULT_FADE: f64 = 0.2;
const DEFAULT_PALETTE: &str = "ink";
/// Vertex count of the circle before resampling.
const COARSE_RESOLUTION: usize = 24;

#[derive(Debug, Clone)]
pub struct NoiseCirclesParams {
    pub rings: usize,
    pub resolution: usize,
    pub amount: f64,
    pub noise_scale: f64,
    pub speed: f64,
    pub stroke_weight: f64,
    /// Alpha of the background wash each frame; 1 clears fully.
    pub fade: f64,
    pub palette: String,
}

impl Default for NoiseCirclesParams {
    fn default() -> Self {
        Self {
            rings: DEFAULT_RINGS,
            resolution: DEFAULT_RESOLUTION,
            amount: DEFAULT_AMOUNT,
            noise_scale: DEFAULT_NOISE_SCALE,
            speed: DEFAULT_SPEED,
            stroke_weight: DEFAULT_STROKE,
            fade: DEFAULT_FADE,
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

impl NoiseCirclesParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            rings: param_usize_in(params, "rings", DEFAULT_RINGS, 1, 64),
            resolution: param_usize_in(params, "resolution", DEFAULT_RESOLUTION, 3, 2000),
            amount: param_f64_in(params, "amount", DEFAULT_AMOUNT, 0.0, 5.0),
            noise_scale: param_f64_in(params, "noise_scale", DEFAULT_NOISE_SCALE, 0.0, 0.1),
            speed: param_f64_in(params, "speed", DEFAULT_SPEED, 0.0, 0.2),
            stroke_weight: param_f64_in(params, "stroke_weight", DEFAULT_STROKE, 0.0, 10.0),
            fade: param_f64_in(params, "fade", DEFAULT_FADE, 0.0, 1.0),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

pub struct NoiseCircles {
    params: NoiseCirclesParams,
    palette: Palette,
    noise: NoiseField,
    center: DVec2,
    max_radius: f64,
    time: f64,
    rings: Vec<Shape>,
}

impl NoiseCircles {
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: NoiseCirclesParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        Ok(Self {
            palette,
            noise: NoiseField::new(noise_seed(seed)).octaves(3, 0.5),
            center: DVec2::new(width as f64, height as f64) * 0.5,
            max_radius: width.min(height) as f64 * 0.42,
            time: 0.0,
            rings: Vec::new(),
            params,
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, NoiseCirclesParams::from_json(params))
    }

    fn build_rings(&self) -> Result<Vec<Shape>, FrescoError> {
        let p = &self.params;
        let spacing = self.max_radius / p.rings as f64;
        (0..p.rings)
            .map(|i| {
                let radius = spacing * (i + 1) as f64;
                let ring = Shape::circle(self.center, radius, COARSE_RESOLUTION)?
                    .resample(p.resolution)?
                    .displace_radial(
                        &self.noise,
                        spacing * p.amount,
                        p.noise_scale,
                        self.time + i as f64 * 0.07,
                    )
                    .relax(0.25, 2);
                Ok(ring)
            })
            .collect()
    }
}

impl Sketch for NoiseCircles {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(Rgba::from(self.palette.sample(0.0)));
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.fade(self.palette.rgba(0.0, self.params.fade));
        self.rings = self.build_rings()?;
        let last = (self.rings.len() - 1).max(1) as f64;
        for (i, ring) in self.rings.iter().enumerate() {
            let color = self.palette.rgba(0.35 + 0.65 * i as f64 / last, 0.85);
            raster.stroke_shape(ring, color, self.params.stroke_weight);
        }
        self.time += self.params.speed;
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        self.rings.clone()
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "rings": p.rings,
            "resolution": p.resolution,
            "amount": p.amount,
            "noise_scale": p.noise_scale,
            "speed": p.speed,
            "stroke_weight": p.stroke_weight,
            "fade": p.fade,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "rings": {
                "type": "integer",
                "default": DEFAULT_RINGS,
                "min": 1,
                "max": 64,
                "description": "Number of concentric rings"
            },
            "resolution": {
                "type": "integer",
                "default": DEFAULT_RESOLUTION,
                "min": 3,
                "max": 2000,
                "description": "Vertices per ring after resampling"
            },
            "amount": {
                "type": "number",
                "default": DEFAULT_AMOUNT,
                "min": 0.0,
                "max": 5.0,
                "description": "Radial displacement in multiples of the ring spacing"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "max": 0.1,
                "description": "Spatial frequency of the noise"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 0.2,
                "description": "Noise time advance per frame"
            },
            "stroke_weight": {
                "type": "number",
                "default": DEFAULT_STROKE,
                "min": 0.0,
                "max": 10.0,
                "description": "Ring line weight in pixels"
            },
            "fade": {
                "type": "number",
                "default": DEFAULT_FADE,
                "min": 0.0,
                "max": 1.0,
                "description": "Background wash alpha per frame (1 clears)"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }
}
