//! Scalar grids sampled by sketches.
//!
//! A [`Field`] holds `width * height` values in [0, 1] in row-major order.
//! Noise rasters, Voronoi edge maps and luminance grids for the ASCII
//! renderer are all fields. Coordinate access wraps toroidally.

use crate::error::FrescoError;

#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

fn checked_len(width: usize, height: usize) -> Result<usize, FrescoError> {
    if width == 0 || height == 0 {
        return Err(FrescoError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(FrescoError::InvalidDimensions)
}

impl Field {
    /// Zero-filled field.
    pub fn new(width: usize, height: usize) -> Result<Self, FrescoError> {
        Self::filled(width, height, 0.0)
    }

    /// Field filled with `value` clamped to [0, 1].
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, FrescoError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value.clamp(0.0, 1.0); len],
        })
    }

    /// Builds a field by evaluating `f(x, y)` for every cell, clamping results.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, FrescoError> {
        let len = checked_len(width, height)?;
        let data = (0..len)
            .map(|i| f(i % width, i / width).clamp(0.0, 1.0))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn index(&self, x: isize, y: isize) -> usize {
        let xi = x.rem_euclid(self.width as isize) as usize;
        let yi = y.rem_euclid(self.height as isize) as usize;
        yi * self.width + xi
    }

    /// Value at `(x, y)` with toroidal wrapping.
    pub fn get(&self, x: isize, y: isize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Sets `(x, y)` with toroidal wrapping; the value is clamped to [0, 1].
    pub fn set(&mut self, x: isize, y: isize, value: f64) {
        let idx = self.index(x, y);
        self.data[idx] = value.clamp(0.0, 1.0);
    }

    /// Bounds-checked read without wrapping.
    pub fn try_get(&self, x: usize, y: usize) -> Result<f64, FrescoError> {
        if x >= self.width || y >= self.height {
            return Err(FrescoError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[y * self.width + x])
    }

    /// Mean of the cells in the rectangle `[x0, x1) x [y0, y1)`, clipped to the grid.
    ///
    /// Returns 0 for an empty rectangle.
    pub fn mean_in(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let (x1, y1) = (x1.min(self.width), y1.min(self.height));
        if x0 >= x1 || y0 >= y1 {
            return 0.0;
        }
        let sum: f64 = (y0..y1)
            .flat_map(|y| self.data[y * self.width + x0..y * self.width + x1].iter())
            .sum();
        sum / ((x1 - x0) * (y1 - y0)) as f64
    }

    /// Element-wise product, clamped.
    pub fn multiply(&self, other: &Field) -> Result<Field, FrescoError> {
        if self.width != other.width || self.height != other.height {
            return Err(FrescoError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        Ok(Field {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a * b).clamp(0.0, 1.0))
                .collect(),
        })
    }

    /// Rescales values so the minimum becomes 0 and the maximum 1.
    ///
    /// A constant field becomes all zeros.
    pub fn normalize(&mut self) {
        let (lo, hi) = self
            .data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let span = hi - lo;
        if span < 1e-12 {
            self.data.iter_mut().for_each(|v| *v = 0.0);
            return;
        }
        self.data.iter_mut().for_each(|v| *v = (*v - lo) / span);
    }

    /// Iterates `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i % self.width, i / self.width, v))
    }
}
