//! Vertex-sequence shapes and the geometry operations sketches apply to them.
//!
//! A [`Shape`] is an ordered list of vertices plus a `closed` flag. Closed
//! shapes have an implicit edge from the last vertex back to the first; the
//! first vertex is never duplicated at the end.
//!
//! Builders ([`Shape::circle`], [`Shape::regular_polygon`]) and
//! [`Shape::resample`] return exactly the requested number of vertices.
//! Transforms consume and return the shape.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::FrescoError;
use crate::noise::NoiseField;

/// Minimum vertex count for a closed shape.
const MIN_CLOSED: usize = 3;
/// Minimum vertex count for an open shape.
const MIN_OPEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    vertices: Vec<DVec2>,
    closed: bool,
}

impl Shape {
    /// Closed polygon through `points`.
    pub fn polygon(points: Vec<DVec2>) -> Self {
        Self {
            vertices: points,
            closed: true,
        }
    }

    /// Open polyline through `points`.
    pub fn polyline(points: Vec<DVec2>) -> Self {
        Self {
            vertices: points,
            closed: false,
        }
    }

    /// Circle approximated by `resolution` evenly spaced vertices, starting at angle 0.
    pub fn circle(center: DVec2, radius: f64, resolution: usize) -> Result<Self, FrescoError> {
        Self::ellipse(center, radius, radius, resolution)
    }

    pub fn ellipse(
        center: DVec2,
        rx: f64,
        ry: f64,
        resolution: usize,
    ) -> Result<Self, FrescoError> {
        check_resolution(resolution, MIN_CLOSED)?;
        let vertices = (0..resolution)
            .map(|i| {
                let a = TAU * i as f64 / resolution as f64;
                center + DVec2::new(a.cos() * rx, a.sin() * ry)
            })
            .collect();
        Ok(Self::polygon(vertices))
    }

    /// Regular polygon with `sides` vertices, the first at angle `rotation`.
    pub fn regular_polygon(
        center: DVec2,
        radius: f64,
        sides: usize,
        rotation: f64,
    ) -> Result<Self, FrescoError> {
        check_resolution(sides, MIN_CLOSED)?;
        let vertices = (0..sides)
            .map(|i| center + DVec2::from_angle(rotation + TAU * i as f64 / sides as f64) * radius)
            .collect();
        Ok(Self::polygon(vertices))
    }

    /// Axis-aligned rectangle from `min` spanning `size`, wound clockwise on screen.
    pub fn rect(min: DVec2, size: DVec2) -> Self {
        Self::polygon(vec![
            min,
            min + DVec2::new(size.x, 0.0),
            min + size,
            min + DVec2::new(0.0, size.y),
        ])
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [DVec2] {
        &mut self.vertices
    }

    pub fn into_vertices(self) -> Vec<DVec2> {
        self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Vertices as a drawable path: closed shapes repeat the first vertex at the end.
    pub fn outline(&self) -> Vec<DVec2> {
        let mut pts = self.vertices.clone();
        if self.closed {
            if let Some(&first) = self.vertices.first() {
                pts.push(first);
            }
        }
        pts
    }

    /// Edges in order, including the closing edge of a closed shape.
    pub fn segments(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        let count = match (self.closed, n) {
            (_, 0 | 1) => 0,
            (true, _) => n,
            (false, _) => n - 1,
        };
        (0..count).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn perimeter(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Shoelace area; positive for counter-clockwise winding in y-up space.
    ///
    /// Open shapes are treated as if closed.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < MIN_CLOSED {
            return 0.0;
        }
        0.5 * (0..n)
            .map(|i| self.vertices[i].perp_dot(self.vertices[(i + 1) % n]))
            .sum::<f64>()
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid, falling back to the vertex mean for zero-area shapes.
    pub fn centroid(&self) -> Option<DVec2> {
        if self.vertices.is_empty() {
            return None;
        }
        let mean = self.vertices.iter().copied().sum::<DVec2>() / self.vertices.len() as f64;
        let a = self.signed_area();
        if a.abs() < 1e-12 {
            return Some(mean);
        }
        let n = self.vertices.len();
        let sum = (0..n).fold(DVec2::ZERO, |acc, i| {
            let (p, q) = (self.vertices[i], self.vertices[(i + 1) % n]);
            acc + (p + q) * p.perp_dot(q)
        });
        Some(sum / (6.0 * a))
    }

    /// `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    pub fn translate(mut self, offset: DVec2) -> Self {
        self.vertices.iter_mut().for_each(|v| *v += offset);
        self
    }

    /// Scales per axis around `pivot`.
    pub fn scale_about(mut self, pivot: DVec2, factor: DVec2) -> Self {
        self.vertices
            .iter_mut()
            .for_each(|v| *v = pivot + (*v - pivot) * factor);
        self
    }

    /// Rotates by `angle` radians around `pivot`.
    pub fn rotate_about(mut self, pivot: DVec2, angle: f64) -> Self {
        let rot = DVec2::from_angle(angle);
        self.vertices
            .iter_mut()
            .for_each(|v| *v = pivot + rot.rotate(*v - pivot));
        self
    }

    /// Reflects across the vertical line `x = axis`.
    pub fn mirror_x(mut self, axis: f64) -> Self {
        self.vertices
            .iter_mut()
            .for_each(|v| v.x = 2.0 * axis - v.x);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.vertices.reverse();
        self
    }

    /// Redistributes the outline to exactly `n` vertices evenly spaced by arc length.
    ///
    /// Open shapes keep both endpoints. Closed shapes start at the first
    /// vertex and space the samples around the whole loop.
    pub fn resample(&self, n: usize) -> Result<Shape, FrescoError> {
        let min = if self.closed { MIN_CLOSED } else { MIN_OPEN };
        check_resolution(n, min)?;
        let total = self.perimeter();
        if self.vertices.len() < MIN_OPEN || total < 1e-12 {
            return Err(FrescoError::DegenerateShape(format!(
                "cannot resample {} vertices with perimeter {total}",
                self.vertices.len()
            )));
        }

        let step = if self.closed {
            total / n as f64
        } else {
            total / (n - 1) as f64
        };

        let mut out = Vec::with_capacity(n);
        let mut segments = self.segments();
        let (mut a, mut b) = segments.next().unwrap_or_default();
        let mut seg_len = a.distance(b);
        // arc length at the start of the current segment
        let mut walked = 0.0;

        for i in 0..n {
            let target = step * i as f64;
            while walked + seg_len < target {
                match segments.next() {
                    Some((na, nb)) => {
                        walked += seg_len;
                        a = na;
                        b = nb;
                        seg_len = a.distance(b);
                    }
                    None => break,
                }
            }
            let t = if seg_len < 1e-12 {
                0.0
            } else {
                ((target - walked) / seg_len).clamp(0.0, 1.0)
            };
            out.push(a.lerp(b, t));
        }

        if !self.closed {
            if let (Some(last_out), Some(&last)) = (out.last_mut(), self.vertices.last()) {
                *last_out = last;
            }
        }

        Ok(Shape {
            vertices: out,
            closed: self.closed,
        })
    }

    /// Chaikin corner cutting. Each pass roughly doubles the vertex count;
    /// open shapes keep their endpoints.
    pub fn smooth(&self, iterations: usize) -> Shape {
        let mut verts = self.vertices.clone();
        for _ in 0..iterations {
            if verts.len() < MIN_CLOSED {
                break;
            }
            let n = verts.len();
            let edges = if self.closed { n } else { n - 1 };
            let mut next = Vec::with_capacity(edges * 2 + 2);
            if !self.closed {
                next.push(verts[0]);
            }
            for i in 0..edges {
                let (p, q) = (verts[i], verts[(i + 1) % n]);
                next.push(p.lerp(q, 0.25));
                next.push(p.lerp(q, 0.75));
            }
            if !self.closed {
                next.push(verts[n - 1]);
            }
            verts = next;
        }
        Shape {
            vertices: verts,
            closed: self.closed,
        }
    }

    /// Moves every vertex a fraction `strength` toward the midpoint of its
    /// neighbours, `iterations` times. Open shapes keep their endpoints.
    pub fn relax(&self, strength: f64, iterations: usize) -> Shape {
        let mut verts = self.vertices.clone();
        let n = verts.len();
        if n < MIN_CLOSED {
            return self.clone();
        }
        for _ in 0..iterations {
            let prev = verts.clone();
            let range = if self.closed { 0..n } else { 1..n - 1 };
            for i in range {
                let mid = (prev[(i + n - 1) % n] + prev[(i + 1) % n]) * 0.5;
                verts[i] = prev[i].lerp(mid, strength);
            }
        }
        Shape {
            vertices: verts,
            closed: self.closed,
        }
    }

    /// Pushes each vertex along the ray from the centroid by
    /// `amount * (2 * noise - 1)`, sampling noise at `vertex * scale` and depth `z`.
    pub fn displace_radial(&self, noise: &NoiseField, amount: f64, scale: f64, z: f64) -> Shape {
        let Some(center) = self.centroid() else {
            return self.clone();
        };
        let vertices = self
            .vertices
            .iter()
            .map(|&v| {
                let dir = (v - center).normalize_or_zero();
                let n = noise.at(v * scale, z);
                v + dir * amount * (n * 2.0 - 1.0)
            })
            .collect();
        Shape {
            vertices,
            closed: self.closed,
        }
    }

    /// Even-odd point-in-polygon test. Open shapes contain nothing.
    pub fn contains(&self, p: DVec2) -> bool {
        if !self.closed || self.vertices.len() < MIN_CLOSED {
            return false;
        }
        self.segments().fold(false, |inside, (a, b)| {
            let crosses = (a.y > p.y) != (b.y > p.y)
                && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            inside ^ crosses
        })
    }
}

fn check_resolution(got: usize, min: usize) -> Result<(), FrescoError> {
    if got < min {
        return Err(FrescoError::InvalidResolution { got, min });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn unit_square() -> Shape {
        Shape::rect(DVec2::ZERO, DVec2::ONE)
    }

    #[test]
    fn circle_has_requested_resolution_and_radius() {
        let c = Shape::circle(DVec2::new(10.0, 5.0), 3.0, 64).unwrap();
        assert_eq!(c.len(), 64);
        assert!(c.is_closed());
        for v in c.vertices() {
            assert!((v.distance(DVec2::new(10.0, 5.0)) - 3.0).abs() < EPS);
        }
    }

    #[test]
    fn circle_rejects_low_resolution() {
        assert!(matches!(
            Shape::circle(DVec2::ZERO, 1.0, 2),
            Err(FrescoError::InvalidResolution { got: 2, min: 3 })
        ));
    }

    #[test]
    fn regular_polygon_first_vertex_follows_rotation() {
        let hex = Shape::regular_polygon(DVec2::ZERO, 2.0, 6, std::f64::consts::FRAC_PI_2).unwrap();
        assert_eq!(hex.len(), 6);
        assert!((hex.vertices()[0] - DVec2::new(0.0, 2.0)).length() < EPS);
    }

    #[test]
    fn square_measurements() {
        let sq = unit_square();
        assert!((sq.perimeter() - 4.0).abs() < EPS);
        assert!((sq.area() - 1.0).abs() < EPS);
        assert!((sq.centroid().unwrap() - DVec2::splat(0.5)).length() < EPS);
        assert_eq!(sq.bounds(), Some((DVec2::ZERO, DVec2::ONE)));
    }

    #[test]
    fn open_polyline_perimeter_skips_closing_edge() {
        let line = Shape::polyline(vec![DVec2::ZERO, DVec2::X, DVec2::ONE]);
        assert!((line.perimeter() - 2.0).abs() < EPS);
        assert_eq!(line.segments().count(), 2);
    }

    #[test]
    fn empty_shape_has_no_centroid_or_bounds() {
        let s = Shape::polygon(vec![]);
        assert!(s.centroid().is_none());
        assert!(s.bounds().is_none());
        assert_eq!(s.segments().count(), 0);
    }

    #[test]
    fn outline_closes_loop() {
        let sq = unit_square();
        let outline = sq.outline();
        assert_eq!(outline.len(), 5);
        assert_eq!(outline.first(), outline.last());
        let line = Shape::polyline(vec![DVec2::ZERO, DVec2::X]);
        assert_eq!(line.outline().len(), 2);
    }

    #[test]
    fn resample_closed_spaces_evenly() {
        let sq = unit_square().resample(8).unwrap();
        assert_eq!(sq.len(), 8);
        let expected = [
            (0.0, 0.0),
            (0.5, 0.0),
            (1.0, 0.0),
            (1.0, 0.5),
            (1.0, 1.0),
            (0.5, 1.0),
            (0.0, 1.0),
            (0.0, 0.5),
        ];
        for (v, (x, y)) in sq.vertices().iter().zip(expected) {
            assert!((*v - DVec2::new(x, y)).length() < 1e-9, "{v:?} != ({x}, {y})");
        }
    }

    #[test]
    fn resample_open_keeps_endpoints() {
        let line = Shape::polyline(vec![DVec2::ZERO, DVec2::new(10.0, 0.0)]);
        let r = line.resample(5).unwrap();
        assert_eq!(r.len(), 5);
        assert_eq!(r.vertices()[0], DVec2::ZERO);
        assert_eq!(r.vertices()[4], DVec2::new(10.0, 0.0));
        assert!((r.vertices()[2] - DVec2::new(5.0, 0.0)).length() < EPS);
    }

    #[test]
    fn resample_rejects_bad_input() {
        assert!(matches!(
            unit_square().resample(2),
            Err(FrescoError::InvalidResolution { .. })
        ));
        let point = Shape::polygon(vec![DVec2::ONE, DVec2::ONE, DVec2::ONE]);
        assert!(matches!(
            point.resample(10),
            Err(FrescoError::DegenerateShape(_))
        ));
        let single = Shape::polyline(vec![DVec2::ONE]);
        assert!(single.resample(4).is_err());
    }

    #[test]
    fn smooth_doubles_closed_vertex_count() {
        let s = unit_square().smooth(2);
        assert_eq!(s.len(), 16);
        assert!(s.area() < 1.0 && s.area() > 0.5);
    }

    #[test]
    fn smooth_open_keeps_endpoints() {
        let line = Shape::polyline(vec![DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::new(2.0, 0.0)]);
        let s = line.smooth(1);
        assert_eq!(s.len(), 6);
        assert_eq!(s.vertices()[0], DVec2::ZERO);
        assert_eq!(*s.vertices().last().unwrap(), DVec2::new(2.0, 0.0));
    }

    #[test]
    fn relax_preserves_count_and_shrinks_corners() {
        let sq = unit_square();
        let relaxed = sq.relax(0.5, 3);
        assert_eq!(relaxed.len(), 4);
        assert!(relaxed.area() < sq.area());
        assert!((relaxed.centroid().unwrap() - DVec2::splat(0.5)).length() < 1e-9);
    }

    #[test]
    fn relax_open_keeps_endpoints() {
        let line = Shape::polyline(vec![DVec2::ZERO, DVec2::new(1.0, 5.0), DVec2::new(2.0, 0.0)]);
        let r = line.relax(1.0, 1);
        assert_eq!(r.vertices()[0], DVec2::ZERO);
        assert_eq!(r.vertices()[2], DVec2::new(2.0, 0.0));
        assert_eq!(r.vertices()[1], DVec2::new(1.0, 0.0));
    }

    #[test]
    fn displace_radial_moves_along_rays_within_amount() {
        let circle = Shape::circle(DVec2::ZERO, 10.0, 48).unwrap();
        let noise = NoiseField::new(4);
        let d = circle.displace_radial(&noise, 2.0, 0.1, 0.0);
        assert_eq!(d.len(), 48);
        for (before, after) in circle.vertices().iter().zip(d.vertices()) {
            let moved = after.length() - before.length();
            assert!(moved.abs() <= 2.0 + EPS);
            assert!(before.normalize().perp_dot(after.normalize()).abs() < 1e-9);
        }
    }

    #[test]
    fn transforms_compose() {
        let sq = unit_square()
            .translate(DVec2::new(-0.5, -0.5))
            .scale_about(DVec2::ZERO, DVec2::splat(2.0))
            .rotate_about(DVec2::ZERO, std::f64::consts::FRAC_PI_2);
        assert!((sq.area() - 4.0).abs() < EPS);
        assert!(sq.centroid().unwrap().length() < EPS);
        assert!((sq.vertices()[0] - DVec2::new(1.0, -1.0)).length() < EPS);
    }

    #[test]
    fn mirror_and_reverse() {
        let line = Shape::polyline(vec![DVec2::new(1.0, 0.0), DVec2::new(3.0, 2.0)]);
        let m = line.clone().mirror_x(5.0);
        assert_eq!(m.vertices(), &[DVec2::new(9.0, 0.0), DVec2::new(7.0, 2.0)]);
        let r = line.reversed();
        assert_eq!(r.vertices()[0], DVec2::new(3.0, 2.0));
    }

    #[test]
    fn contains_uses_even_odd_rule() {
        let sq = unit_square();
        assert!(sq.contains(DVec2::splat(0.5)));
        assert!(!sq.contains(DVec2::new(1.5, 0.5)));
        let open = Shape::polyline(sq.vertices().to_vec());
        assert!(!open.contains(DVec2::splat(0.5)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resample_always_returns_requested_count(
                radius in 0.5_f64..500.0,
                base in 3_usize..64,
                n in 3_usize..400,
                closed: bool,
            ) {
                let circle = Shape::circle(DVec2::ZERO, radius, base).unwrap();
                let shape = if closed {
                    circle
                } else {
                    Shape::polyline(circle.into_vertices())
                };
                let r = shape.resample(n).unwrap();
                prop_assert_eq!(r.len(), n);
                prop_assert_eq!(r.is_closed(), closed);
            }

            #[test]
            fn resampled_circle_stays_on_or_inside_circle(
                radius in 1.0_f64..100.0,
                n in 3_usize..200,
            ) {
                let circle = Shape::circle(DVec2::ZERO, radius, 90).unwrap();
                for v in circle.resample(n).unwrap().vertices() {
                    prop_assert!(v.length() <= radius + 1e-6);
                }
            }
        }
    }
}
