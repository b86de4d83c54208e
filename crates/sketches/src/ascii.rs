//! ASCII art from an animated noise luminance field.
//!
//! The canvas is divided into square cells. Each cell's luminance picks a
//! glyph from a dark-to-light character ramp for the text output, and sets
//! the size of a filled block on the raster.

use fresco_core::params::{param_bool, param_f64_in, param_string, param_usize_in};
use fresco_core::{DVec2, Field, FrescoError, NoiseField, Palette, Shape};
use serde_json::{json, Value};

use crate::raster::Raster;
use crate::sketch::Sketch;
use crate::{noise_seed, palette_param};

const DEFAULT_CELL: usize = 8;
const DEFAULT_NOISE_SCALE: f64 = 0.12;
const DEFAULT_SPEED: f64 = 0.03;
const DEFAULT_CONTRAST: f64 = 2.0;
/// Dark to light.
pub const DEFAULT_CHARSET: &str = " .:-=+*#%@";
const DEFAULT_INVERT: bool = false;
const DEFAULT_PALETTE: &str = "mono";
/// Blocks smaller than this many pixels are neither drawn nor exported.
const MIN_BLOCK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct AsciiParams {
    /// Cell edge in pixels.
    pub cell: usize,
    /// Noise frequency per cell.
    pub noise_scale: f64,
    pub speed: f64,
    /// Gain around mid grey applied to the noise.
    pub contrast: f64,
    pub charset: String,
    pub invert: bool,
    pub palette: String,
}

impl Default for AsciiParams {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl AsciiParams {
    pub fn from_json(params: &Value) -> Self {
        let mut charset = param_string(params, "charset", DEFAULT_CHARSET);
        if charset.is_empty() {
            charset = DEFAULT_CHARSET.to_string();
        }
        Self {
            cell: param_usize_in(params, "cell", DEFAULT_CELL, 1, 128),
            noise_scale: param_f64_in(params, "noise_scale", DEFAULT_NOISE_SCALE, 0.0, 2.0),
            speed: param_f64_in(params, "speed", DEFAULT_SPEED, 0.0, 0.5),
            contrast: param_f64_in(params, "contrast", DEFAULT_CONTRAST, 0.0, 10.0),
            charset,
            invert: param_bool(params, "invert", DEFAULT_INVERT),
            palette: param_string(params, "palette", DEFAULT_PALETTE),
        }
    }
}

pub struct Ascii {
    params: AsciiParams,
    palette: Palette,
    noise: NoiseField,
    ramp: Vec<char>,
    cols: usize,
    rows: usize,
    field: Field,
    time: f64,
}

impl Ascii {
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        mut params: AsciiParams,
    ) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let palette = palette_param(&mut params.palette, DEFAULT_PALETTE)?;
        let cols = width.div_ceil(params.cell);
        let rows = height.div_ceil(params.cell);
        Ok(Self {
            palette,
            noise: NoiseField::new(noise_seed(seed)).octaves(3, 0.5),
            ramp: params.charset.chars().collect(),
            cols,
            rows,
            field: Field::new(cols, rows)?,
            time: 0.0,
            params,
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FrescoError> {
        Self::new(width, height, seed, AsciiParams::from_json(params))
    }

    /// Luminance per cell of the current frame.
    pub fn field(&self) -> &Field {
        &self.field
    }

    fn sample(&self) -> Result<Field, FrescoError> {
        let p = &self.params;
        // half-cell offset keeps samples off the noise lattice
        Field::from_fn(self.cols, self.rows, |x, y| {
            let n = self
                .noise
                .get((x as f64 + 0.5) * p.noise_scale, (y as f64 + 0.5) * p.noise_scale, self.time);
            let v = (n - 0.5) * p.contrast + 0.5;
            if p.invert {
                1.0 - v
            } else {
                v
            }
        })
    }

    /// Block for cell `(x, y)` with luminance `v`: centered, its edge scaled by `v`.
    fn block(&self, x: usize, y: usize, v: f64) -> Option<(DVec2, DVec2)> {
        let cell = self.params.cell as f64;
        let edge = cell * v;
        if edge < MIN_BLOCK {
            return None;
        }
        let min = DVec2::new(x as f64, y as f64) * cell + DVec2::splat((cell - edge) * 0.5);
        Some((min, DVec2::splat(edge)))
    }
}

/// Maps each field value to a glyph from `ramp` (dark to light), one line per row.
pub fn field_to_ascii(field: &Field, ramp: &[char]) -> String {
    if ramp.is_empty() {
        return String::new();
    }
    let top = (ramp.len() - 1) as f64;
    let mut out = String::with_capacity((field.width() + 1) * field.height());
    for (x, _, v) in field.iter() {
        out.push(ramp[(v * top).round() as usize]);
        if x + 1 == field.width() {
            out.push('\n');
        }
    }
    out
}

/// Mean luminance of each `cell x cell` block of the raster; edge blocks are
/// partial.
pub fn raster_to_field(raster: &Raster, cell: usize) -> Result<Field, FrescoError> {
    let cell = cell.max(1);
    let cols = raster.width().div_ceil(cell);
    let rows = raster.height().div_ceil(cell);
    Field::from_fn(cols, rows, |x, y| {
        raster.mean_luminance(x * cell, y * cell, (x + 1) * cell, (y + 1) * cell)
    })
}

impl Sketch for Ascii {
    fn setup(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        raster.background(self.palette.rgba(0.0, 1.0));
        Ok(())
    }

    fn draw(&mut self, raster: &mut Raster) -> Result<(), FrescoError> {
        self.field = self.sample()?;
        raster.background(self.palette.rgba(0.0, 1.0));
        for (x, y, v) in self.field.iter() {
            if let Some((min, size)) = self.block(x, y, v) {
                raster.fill_rect(min, size, self.palette.rgba(v, 1.0));
            }
        }
        self.time += self.params.speed;
        Ok(())
    }

    fn shapes(&self) -> Vec<Shape> {
        self.field
            .iter()
            .filter_map(|(x, y, v)| self.block(x, y, v))
            .map(|(min, size)| Shape::rect(min, size))
            .collect()
    }

    fn text(&self) -> Option<String> {
        Some(field_to_ascii(&self.field, &self.ramp))
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "cell": p.cell,
            "noise_scale": p.noise_scale,
            "speed": p.speed,
            "contrast": p.contrast,
            "charset": p.charset,
            "invert": p.invert,
            "palette": p.palette,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "cell": {
                "type": "integer",
                "default": DEFAULT_CELL,
                "min": 1,
                "max": 128,
                "description": "Cell edge in pixels"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "max": 2.0,
                "description": "Noise frequency per cell"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 0.5,
                "description": "Noise time advance per frame"
            },
            "contrast": {
                "type": "number",
                "default": DEFAULT_CONTRAST,
                "min": 0.0,
                "max": 10.0,
                "description": "Gain around mid grey"
            },
            "charset": {
                "type": "string",
                "default": DEFAULT_CHARSET,
                "description": "Glyph ramp from dark to light"
            },
            "invert": {
                "type": "boolean",
                "default": DEFAULT_INVERT,
                "description": "Swap dark and light"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "description": "Palette name or comma separated hex stops"
            }
        })
    }
}
