//! Nearest-site lookup over a set of 2D sites.
//!
//! Lookups are brute force over the sites, which is fast enough for the few
//! hundred sites a sketch uses. Ties resolve to the lowest site index.

use glam::DVec2;

use crate::error::FrescoError;
use crate::field::Field;

#[derive(Debug, Clone)]
pub struct Voronoi {
    sites: Vec<DVec2>,
}

/// Result of a two-nearest query: closest site and the distances to the
/// closest (`f1`) and second closest (`f2`) sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPair {
    pub index: usize,
    pub f1: f64,
    pub f2: f64,
}

impl Voronoi {
    /// Requires at least one site.
    pub fn new(sites: Vec<DVec2>) -> Result<Self, FrescoError> {
        if sites.is_empty() {
            return Err(FrescoError::DegenerateShape(
                "voronoi requires at least one site".to_string(),
            ));
        }
        Ok(Self { sites })
    }

    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    pub fn sites_mut(&mut self) -> &mut [DVec2] {
        &mut self.sites
    }

    /// Index of and distance to the closest site.
    pub fn nearest(&self, p: DVec2) -> (usize, f64) {
        let (index, d2) = self
            .sites
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(best, best_d2), (i, s)| {
                let d2 = s.distance_squared(p);
                if d2 < best_d2 {
                    (i, d2)
                } else {
                    (best, best_d2)
                }
            });
        (index, d2.sqrt())
    }

    /// Closest and second closest distances. With a single site `f2` is infinite.
    pub fn two_nearest(&self, p: DVec2) -> NearestPair {
        let mut index = 0;
        let (mut d1, mut d2) = (f64::INFINITY, f64::INFINITY);
        for (i, s) in self.sites.iter().enumerate() {
            let d = s.distance_squared(p);
            if d < d1 {
                d2 = d1;
                d1 = d;
                index = i;
            } else if d < d2 {
                d2 = d;
            }
        }
        NearestPair {
            index,
            f1: d1.sqrt(),
            f2: d2.sqrt(),
        }
    }

    /// Field of cell-edge proximity: `F2 - F1` per pixel, normalized so
    /// cell borders are 0 and cell interiors approach 1.
    pub fn edge_field(&self, width: usize, height: usize) -> Result<Field, FrescoError> {
        let mut field = Field::from_fn(width, height, |x, y| {
            let pair = self.two_nearest(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
            if pair.f2.is_finite() {
                // divided by the canvas extent so values stay under the field clamp
                (pair.f2 - pair.f1) / (width.max(height) as f64)
            } else {
                1.0
            }
        })?;
        field.normalize();
        Ok(field)
    }

    /// Per-pixel owning site index, row-major.
    pub fn cell_indices(&self, width: usize, height: usize) -> Vec<usize> {
        (0..width * height)
            .map(|i| {
                let p = DVec2::new((i % width) as f64 + 0.5, (i / width) as f64 + 0.5);
                self.nearest(p).0
            })
            .collect()
    }

    /// One Lloyd relaxation step over the rectangle `[0, width] x [0, height]`.
    ///
    /// Each cell's centroid is estimated from a `samples x samples` grid of
    /// probe points. Sites whose cells catch no probe stay put. Returns the
    /// largest distance any site moved.
    pub fn relax(&mut self, width: f64, height: f64, samples: usize) -> f64 {
        let samples = samples.max(1);
        let mut sums = vec![DVec2::ZERO; self.sites.len()];
        let mut counts = vec![0usize; self.sites.len()];
        for j in 0..samples {
            for i in 0..samples {
                let p = DVec2::new(
                    (i as f64 + 0.5) / samples as f64 * width,
                    (j as f64 + 0.5) / samples as f64 * height,
                );
                let (idx, _) = self.nearest(p);
                sums[idx] += p;
                counts[idx] += 1;
            }
        }
        self.sites
            .iter_mut()
            .zip(sums.iter().zip(&counts))
            .filter(|(_, (_, count))| **count > 0)
            .fold(0.0, |moved: f64, (site, (&sum, &count))| {
                let centroid = sum / count as f64;
                let d = site.distance(centroid);
                *site = centroid;
                moved.max(d)
            })
    }
}
