//! Drifting Voronoi cells with darkened borders.
//!
//! Sites wander through a noise flow field and wrap around the canvas. Each
//! pixel takes its cell's palette tone and is shaded by `F2 - F1` (distance to
//! the second-nearest site minus distance to the nearest), which is zero on
//! cell borders. Optional Lloyd relaxation evens out the cells over time.

use std::f64::consts::TAU;

use fresco_core::params::{param_f64_in, param_string, param_usize_in};
use fresco_core::{
    DVec2, Field, FrescoError, NoiseField, Palette, Rgba, Shape, Voronoi, Xorshift64,
};
use serde_json::{json, Value};

use crate::raster::Raster;
use crate::sketch::Sketch;
use crate::{noise_seed, palette_param};

const DEFAULT_SITES: usize = 24;
const DEFAULT_DRIFT: f64 = 0.6;
const DEFAULT_NOISE_SCALE: f64 = 0.004;
const DEFAULT_SPEED: f64 = 0.005;
const DEFAULT_EDGE_WIDTH: f64 = 6.0;
const DEFAULT_RELAX: usize = 0;
const DEFAULT_PALETTE: &str = "ocean";
/// Probe grid per axis for Lloyd relaxation.
const RELAX_SAMPLES: usize = 48;
/// Rays cast per cell when tracing outlines.
const OUTLINE_RAYS: usize = 48;
/// Bisection steps when locating a cell border along a ray.
const OUTLINE_BISECTIONS: usize = 24;

#[derive(Debug, Clone)]
pub struct VoronoiParams {
    pub sites: usize,
    /// Site speed in pixels per frame.
    pub drift: f64,
    pub noise_scale: f64,
    pub speed: f64,
    /// `F2 - F1` distance in pixels over which borders fade to full color.
    pub edge_width: f64,
    /// Lloyd relaxation passes per frame.
    pub relax: usize,
    pub palette: String,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl VoronoiParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            sites: param_usize_in(params, "sites", DEFAULT_SITES, 1, 1000),
            drift: param_f64_in(params, "drift", DEFAULT_DRIFT, 0.0, 10.0),
            noise_scale: param_f64_in(params, "noise_scale", DEFAULT_NOISE_SCALE, 0.0, 0.1),
            speed: param_f64_in(params, "speed", DEFAULT_SPEED, 0.0, 0.2),
            edge_width: param_f64_in(params, "edge_width", DEFAULT_EDGE_WIDTH, 0.5, 100.0),
            relax: param_usize_in(params, "relax", DEFAULT_RELAX, 0, 10),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

pub struct VoronoiCells {
    params: VoronoiParams,
    palette: Palette,
    voronoi: Voronoi,
    /// Palette position per site.
    tones: Vec<f64>,
    flow: NoiseField,
    size: DVec2,
    time: f64,
}

impl VoronoiCells {
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: VoronoiParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        let size = DVec2::new(width as f64, height as f64);
        let mut rng = Xorshift64::new(seed);
        let sites = (0..params.sites)
            .map(|_| DVec2::new(rng.next_range(0.0, size.x), rng.next_range(0.0, size.y)))
            .collect();
        let tones = (0..params.sites).map(|_| rng.next_range(0.15, 1.0)).collect();
        Ok(Self {
            voronoi: Voronoi::new(sites)?,
            tones,
            flow: NoiseField::new(noise_seed(seed)),
            palette,
            params,
            size,
            time: 0.0,
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, VoronoiParams::from_json(params))
    }

    pub fn voronoi(&self) -> &Voronoi {
        &self.voronoi
    }

    fn drift_sites(&mut self) {
        let (flow, p, size, time) = (&self.flow, &self.params, self.size, self.time);
        for site in self.voronoi.sites_mut() {
            let angle = flow.at(*site * p.noise_scale, time) * TAU * 2.0;
            let moved = *site + DVec2::from_angle(angle) * p.drift;
            *site = DVec2::new(wrap(moved.x, size.x), wrap(moved.y, size.y));
        }
    }

    /// Outline of one cell clipped to the canvas.
    ///
    /// Cells are convex and contain their site, so the border along each ray
    /// from the site is the single point where ownership changes.
    pub fn cell_outline(&self, index: usize) -> Option<Shape> {
        let site = *self.voronoi.sites().get(index)?;
        let vertices = (0..OUTLINE_RAYS)
            .map(|k| {
                let dir = DVec2::from_angle(TAU * k as f64 / OUTLINE_RAYS as f64);
                let reach = ray_to_edge(site, dir, self.size);
                if self.voronoi.nearest(site + dir * reach).0 == index {
                    return site + dir * reach;
                }
                let (mut inside, mut outside) = (0.0, reach);
                for _ in 0..OUTLINE_BISECTIONS {
                    let mid = (inside + outside) * 0.5;
                    if self.voronoi.nearest(site + dir * mid).0 == index {
                        inside = mid;
                    } else {
                        outside = mid;
                    }
                }
                site + dir * inside
            })
            .collect();
        Some(Shape::polygon(vertices))
    }
}

/// Wraps into `[0, extent)`. `rem_euclid` can round up to `extent` itself.
fn wrap(v: f64, extent: f64) -> f64 {
    let w = v.rem_euclid(extent);
    if w >= extent {
        0.0
    } else {
        w
    }
}

/// Distance from `origin` (inside the canvas) along `dir` to the canvas edge.
fn ray_to_edge(origin: DVec2, dir: DVec2, size: DVec2) -> f64 {
    let axis = |o: f64, d: f64, extent: f64| {
        if d > 1e-12 {
            (extent - o) / d
        } else if d < -1e-12 {
            -o / d
        } else {
            f64::INFINITY
        }
    };
    axis(origin.x, dir.x, size.x).min(axis(origin.y, dir.y, size.y)).max(0.0)
}

impl Sketch for VoronoiCells {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(Rgba::BLACK);
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        self.drift_sites();
        for _ in 0..self.params.relax {
            self.voronoi.relax(self.size.x, self.size.y, RELAX_SAMPLES);
        }

        let (w, h) = (raster.width(), raster.height());
        let pairs: Vec<_> = (0..w * h)
            .map(|i| {
                let p = DVec2::new((i % w) as f64 + 0.5, (i / w) as f64 + 0.5);
                self.voronoi.two_nearest(p)
            })
            .collect();
        let tone = Field::from_fn(w, h, |x, y| self.tones[pairs[y * w + x].index])?;
        let shade = Field::from_fn(w, h, |x, y| {
            let pair = pairs[y * w + x];
            if pair.f2.is_finite() {
                (pair.f2 - pair.f1) / self.params.edge_width
            } else {
                1.0
            }
        })?;
        raster.paint_shaded_field(&tone, &shade, &self.palette)?;

        for &site in self.voronoi.sites() {
            raster.fill_circle(site, 1.5, Rgba::WHITE.with_alpha(0.7));
        }
        self.time += self.params.speed;
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        (0..self.voronoi.sites().len())
            .filter_map(|i| self.cell_outline(i))
            .collect()
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "sites": p.sites,
            "drift": p.drift,
            "noise_scale": p.noise_scale,
            "speed": p.speed,
            "edge_width": p.edge_width,
            "relax": p.relax,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "sites": {
                "type": "integer",
                "default": DEFAULT_SITES,
                "min": 1,
                "max": 1000,
                "description": "Number of Voronoi sites"
            },
            "drift": {
                "type": "number",
                "default": DEFAULT_DRIFT,
                "min": 0.0,
                "max": 10.0,
                "description": "Site speed in pixels per frame"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "max": 0.1,
                "description": "Spatial frequency of the flow field steering the sites"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 0.2,
                "description": "Flow field time advance per frame"
            },
            "edge_width": {
                "type": "number",
                "default": DEFAULT_EDGE_WIDTH,
                "min": 0.5,
                "max": 100.0,
                "description": "Width of the darkened cell borders in pixels"
            },
            "relax": {
                "type": "integer",
                "default": DEFAULT_RELAX,
                "min": 0,
                "max": 10,
                "description": "Lloyd relaxation passes per frame"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }
}
