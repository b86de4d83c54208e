//! Static vessel generator.
//!
//! A handful of control radii are drawn from 1D noise down the height of the
//! pot. The right-hand profile is smoothed, mirrored across the center line
//! and joined into one closed outline. Glaze bands reuse the same profile so
//! they follow the curve of the body exactly.

use fresco_core::params::{
    param_bool, param_f64_in, param_range_in, param_string, param_usize_in,
};
use fresco_core::{DVec2, FrescoError, NoiseField, Palette, Shape, Xorshift64};
use serde_json::{json, Value};

use crate::raster::Raster;
use crate::sketch::Sketch;
use crate::{noise_seed, palette_param};

const DEFAULT_CONTROL_POINTS: usize = 7;
const DEFAULT_RESOLUTION: usize = 240;
const DEFAULT_HEIGHT: f64 = 0.75;
const DEFAULT_WIDTH: f64 = 0.3;
/// Narrowest control radius relative to the widest.
const DEFAULT_WAIST: f64 = 0.3;
const DEFAULT_ROUGHNESS: f64 = 1.6;
const DEFAULT_BANDS: usize = 3;
const DEFAULT_BAND_HEIGHT: (f64, f64) = (0.03, 0.09);
const DEFAULT_RIM: bool = true;
const DEFAULT_PALETTE: &str = "clay";
/// Chaikin passes over the control profile.
const PROFILE_SMOOTHING: usize = 3;
/// Vertices along each side of a glaze band.
const BAND_SAMPLES: usize = 24;
const RIM_RESOLUTION: usize = 48;
/// Rim ellipse height relative to its width.
const RIM_ASPECT: f64 = 0.18;

#[derive(Debug, Clone)]
pub struct PotteryParams {
    pub control_points: usize,
    /// Vertices in the closed vessel outline.
    pub resolution: usize,
    /// Vessel height as a fraction of the canvas height.
    pub height: f64,
    /// Widest half-width as a fraction of the canvas width.
    pub width: f64,
    pub waist: f64,
    /// Noise frequency along the profile; higher gives more bulges.
    pub roughness: f64,
    pub bands: usize,
    /// Band height range as a fraction of the vessel height.
    pub band_height: (f64, f64),
    pub rim: bool,
    pub palette: String,
}

impl Default for PotteryParams {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl PotteryParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            control_points: param_usize_in(params, "control_points", DEFAULT_CONTROL_POINTS, 2, 32),
            resolution: param_usize_in(params, "resolution", DEFAULT_RESOLUTION, 8, 4000),
            height: param_f64_in(params, "height", DEFAULT_HEIGHT, 0.05, 1.0),
            width: param_f64_in(params, "width", DEFAULT_WIDTH, 0.01, 0.5),
            waist: param_f64_in(params, "waist", DEFAULT_WAIST, 0.05, 1.0),
            roughness: param_f64_in(params, "roughness", DEFAULT_ROUGHNESS, 0.0, 10.0),
            bands: param_usize_in(params, "bands", DEFAULT_BANDS, 0, 20),
            band_height: param_range_in(params, "band_height", DEFAULT_BAND_HEIGHT, 0.0, 1.0),
            rim: param_bool(params, "rim", DEFAULT_RIM),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

/// Right-hand half-width of the vessel as a function of height.
///
/// Vertices run top to bottom with strictly increasing `y`.
struct Profile {
    center_x: f64,
    points: Vec<DVec2>,
}

impl Profile {
    fn top(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.y)
    }

    fn bottom(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.y)
    }

    /// Half-width at `y`, interpolated between profile vertices and clamped
    /// to the ends.
    fn radius_at(&self, y: f64) -> f64 {
        let idx = self.points.partition_point(|p| p.y < y);
        let r = |p: DVec2| p.x - self.center_x;
        match (idx.checked_sub(1).and_then(|i| self.points.get(i)), self.points.get(idx)) {
            (Some(&a), Some(&b)) => {
                let t = if b.y - a.y > 1e-12 { (y - a.y) / (b.y - a.y) } else { 0.0 };
                r(a) + (r(b) - r(a)) * t
            }
            (None, Some(&b)) => r(b),
            (Some(&a), None) => r(a),
            (None, None) => 0.0,
        }
    }

    /// Closed outline between `y0` and `y1` following both sides of the body.
    fn slice(&self, y0: f64, y1: f64) -> Shape {
        let ys: Vec<f64> = (0..BAND_SAMPLES)
            .map(|i| y0 + (y1 - y0) * i as f64 / (BAND_SAMPLES - 1) as f64)
            .collect();
        let right = ys.iter().map(|&y| DVec2::new(self.center_x + self.radius_at(y), y));
        let left = ys.iter().rev().map(|&y| DVec2::new(self.center_x - self.radius_at(y), y));
        Shape::polygon(right.chain(left).collect())
    }
}

pub struct Pottery {
    params: PotteryParams,
    palette: Palette,
    vessel: Shape,
    bands: Vec<(Shape, f64)>,
    rim: Option<Shape>,
}

impl Pottery {
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: PotteryParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        let (w, h) = (width as f64, height as f64);
        let mut rng = Xorshift64::new(seed);
        let noise = NoiseField::new(noise_seed(seed)).octaves(2, 0.5);

        let profile = build_profile(&params, &noise, &mut rng, w, h)?;
        let right = Shape::polyline(profile.points.clone());
        let left = right.clone().mirror_x(profile.center_x).reversed();
        let outline: Vec<DVec2> = right
            .into_vertices()
            .into_iter()
            .chain(left.into_vertices())
            .collect();
        let vessel = Shape::polygon(outline).resample(params.resolution)?;

        let span = profile.bottom() - profile.top();
        let bands = (0..params.bands)
            .map(|_| {
                let band = span * rng.next_range(params.band_height.0, params.band_height.1);
                let y0 = profile.top() + span * rng.next_range(0.15, 0.85);
                let y1 = (y0 + band).min(profile.bottom());
                (profile.slice(y0, y1), rng.next_range(0.0, 1.0))
            })
            .collect();

        let rim = if params.rim {
            let rx = profile.radius_at(profile.top());
            let center = DVec2::new(profile.center_x, profile.top());
            Some(Shape::ellipse(center, rx, rx * RIM_ASPECT, RIM_RESOLUTION)?)
        } else {
            None
        };

        log::debug!(
            "pottery: {} outline vertices, {} bands",
            vessel.len(),
            params.bands
        );
        Ok(Self {
            params,
            palette,
            vessel,
            bands,
            rim,
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, PotteryParams::from_json(params))
    }

    pub fn vessel(&self) -> &Shape {
        &self.vessel
    }
}

fn build_profile(
    params: &PotteryParams,
    noise: &NoiseField,
    rng: &mut Xorshift64,
    w: f64,
    h: f64,
) -> Result<Profile, FrescoError> {
    let center_x = w * 0.5;
    let top = h * (1.0 - params.height) * 0.5;
    let bottom = top + h * params.height;
    let widest = w * params.width;
    // lift off the lattice, where Perlin noise is flat
    let offset = rng.next_range(0.1, 0.9);
    let last = (params.control_points - 1) as f64;

    let controls: Vec<DVec2> = (0..params.control_points)
        .map(|i| {
            let t = i as f64 / last;
            let n = noise.get(t * params.roughness + offset, offset, 0.0);
            let r = widest * (params.waist + (1.0 - params.waist) * n);
            DVec2::new(center_x + r.max(1.0), top + t * (bottom - top))
        })
        .collect();
    let points = Shape::polyline(controls)
        .smooth(PROFILE_SMOOTHING)
        .into_vertices();
    if points.len() < 2 {
        return Err(FrescoError::DegenerateShape("pottery profile".to_string()));
    }
    Ok(Profile { center_x, points })
}

impl Sketch for Pottery {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(self.palette.rgba(1.0, 1.0));
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(self.palette.rgba(1.0, 1.0));
        let body = self.palette.rgba(0.45, 1.0);
        let line = self.palette.rgba(0.0, 1.0);
        raster.fill_shape(&self.vessel, body);
        for (band, tone) in &self.bands {
            raster.fill_shape(band, self.palette.rgba(*tone * 0.6, 0.9));
        }
        if let Some(rim) = &self.rim {
            raster.fill_shape(rim, self.palette.rgba(0.1, 1.0));
            raster.stroke_shape(rim, line, 1.5);
        }
        raster.stroke_shape(&self.vessel, line, 2.0);
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        let mut shapes = vec![self.vessel.clone()];
        shapes.extend(self.bands.iter().map(|(band, _)| band.clone()));
        shapes.extend(self.rim.clone());
        shapes
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "control_points": p.control_points,
            "resolution": p.resolution,
            "height": p.height,
            "width": p.width,
            "waist": p.waist,
            "roughness": p.roughness,
            "bands": p.bands,
            "band_height": [p.band_height.0, p.band_height.1],
            "rim": p.rim,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "control_points": {
                "type": "integer",
                "default": DEFAULT_CONTROL_POINTS,
                "min": 2,
                "max": 32,
                "description": "Noise-driven radii down the profile"
            },
            "resolution": {
                "type": "integer",
                "default": DEFAULT_RESOLUTION,
                "min": 8,
                "max": 4000,
                "description": "Vertices in the vessel outline"
            },
            "height": {
                "type": "number",
                "default": DEFAULT_HEIGHT,
                "min": 0.05,
                "max": 1.0,
                "description": "Vessel height as a fraction of the canvas height"
            },
            "width": {
                "type": "number",
                "default": DEFAULT_WIDTH,
                "min": 0.01,
                "max": 0.5,
                "description": "Widest half-width as a fraction of the canvas width"
            },
            "waist": {
                "type": "number",
                "default": DEFAULT_WAIST,
                "min": 0.05,
                "max": 1.0,
                "description": "Narrowest radius relative to the widest"
            },
            "roughness": {
                "type": "number",
                "default": DEFAULT_ROUGHNESS,
                "min": 0.0,
                "max": 10.0,
                "description": "Noise frequency along the profile"
            },
            "bands": {
                "type": "integer",
                "default": DEFAULT_BANDS,
                "min": 0,
                "max": 20,
                "description": "Number of glaze bands"
            },
            "band_height": {
                "type": "range",
                "default": [DEFAULT_BAND_HEIGHT.0, DEFAULT_BAND_HEIGHT.1],
                "min": 0.0,
                "max": 1.0,
                "description": "Band height range as a fraction of the vessel height"
            },
            "rim": {
                "type": "boolean",
                "default": DEFAULT_RIM,
                "description": "Draw the opening as an ellipse"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }

    fn is_static(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host;

    fn pot(seed: u64, params: Value) -> Pottery {
        Pottery::from_json(200, 240, seed, &params).unwrap()
    }

    #[test]
    fn vessel_is_closed_with_requested_resolution() {
        let p = pot(1, json!({"resolution": 150}));
        assert!(p.vessel().is_closed());
        assert_eq!(p.vessel().len(), 150);
    }

    #[test]
    fn vessel_is_symmetric_about_the_center() {
        let p = pot(4, json!({}));
        let (lo, hi) = p.vessel().bounds().unwrap();
        assert!(((lo.x + hi.x) * 0.5 - 100.0).abs() < 1.0);
        let centroid = p.vessel().centroid().unwrap();
        assert!((centroid.x - 100.0).abs() < 1.0);
    }

    #[test]
    fn vessel_fits_its_height_and_width() {
        let p = pot(8, json!({"height": 0.5, "width": 0.25}));
        let (lo, hi) = p.vessel().bounds().unwrap();
        assert!(lo.y >= 60.0 - 1e-6 && hi.y <= 180.0 + 1e-6);
        assert!(hi.x - lo.x <= 2.0 * 50.0 + 1e-6);
    }

    #[test]
    fn bands_lie_inside_the_vessel() {
        let p = pot(2, json!({"bands": 4}));
        let shapes = p.shapes();
        // vessel, 4 bands, rim
        assert_eq!(shapes.len(), 6);
        for band in &shapes[1..5] {
            let c = band.centroid().unwrap();
            assert!(p.vessel().contains(c));
        }
    }

    #[test]
    fn out_of_range_counts_are_clamped() {
        let params = json!({
            "resolution": 1_000_000_000_000_000u64,
            "control_points": 9000,
            "bands": 1_000_000,
            "band_height": [-2.0, 40.0],
        });
        let s = Pottery::from_json(100, 100, 4, &params).unwrap();
        let p = s.params();
        assert_eq!(p["resolution"], 4000);
        assert_eq!(p["control_points"], 32);
        assert_eq!(p["bands"], 20);
        assert_eq!(p["band_height"], json!([0.0, 1.0]));
        assert_eq!(s.vessel().len(), 4000);
    }

    #[test]
    fn rim_can_be_disabled() {
        let p = pot(2, json!({"bands": 0, "rim": false}));
        assert_eq!(p.shapes().len(), 1);
    }

    #[test]
    fn profile_radius_interpolates_and_clamps() {
        let profile = Profile {
            center_x: 10.0,
            points: vec![DVec2::new(12.0, 0.0), DVec2::new(16.0, 10.0)],
        };
        assert_eq!(profile.radius_at(-5.0), 2.0);
        assert_eq!(profile.radius_at(5.0), 4.0);
        assert_eq!(profile.radius_at(50.0), 6.0);
        let band = profile.slice(0.0, 10.0);
        assert_eq!(band.len(), BAND_SAMPLES * 2);
        assert!(band.contains(DVec2::new(10.0, 5.0)));
    }

    #[test]
    fn draws_once_and_fills_the_center() {
        let mut p = pot(5, json!({"bands": 0, "rim": false}));
        let mut raster = Raster::new(200, 240).unwrap();
        assert_eq!(host::run(&mut p, &mut raster, 30).unwrap(), 1);
        let corner = raster.pixel(2, 2).unwrap();
        let middle = raster.pixel(100, 120).unwrap();
        assert_ne!(corner, middle);
    }

    #[test]
    fn seeds_give_different_vessels() {
        assert_ne!(pot(1, json!({})).vessel(), pot(2, json!({})).vessel());
    }
}
