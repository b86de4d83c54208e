//! RGBA drawing surface for sketches.
//!
//! Shapes are rasterized with `imageproc` into a coverage mask the size of
//! their clipped bounding box, then composited onto the canvas with the
//! active [`BlendMode`] and the color's alpha. The canvas itself stays opaque.

use fresco_core::{Field, FrescoError, Palette, Rgba, Shape};
use glam::DVec2;
use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::pixel::{field_to_rgba, shaded_field_to_rgba};

/// How a source color combines with the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    /// Adds light; overlapping strokes brighten toward white.
    Additive,
    Multiply,
    Screen,
}

impl BlendMode {
    fn mix(self, src: f64, dst: f64) -> f64 {
        match self {
            BlendMode::Normal => src,
            BlendMode::Additive => (src + dst).min(1.0),
            BlendMode::Multiply => src * dst,
            BlendMode::Screen => 1.0 - (1.0 - src) * (1.0 - dst),
        }
    }
}

const COVERED: Luma<u8> = Luma([255]);

pub struct Raster {
    image: RgbaImage,
    pub blend: BlendMode,
}

impl Raster {
    /// Opaque black canvas. Fails on zero dimensions or sizes beyond `u32`.
    pub fn new(width: usize, height: usize) -> Result<Self, FrescoError> {
        if width == 0 || height == 0 {
            return Err(FrescoError::InvalidDimensions);
        }
        let w = u32::try_from(width).map_err(|_| FrescoError::InvalidDimensions)?;
        let h = u32::try_from(height).map_err(|_| FrescoError::InvalidDimensions)?;
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(FrescoError::InvalidDimensions)?;
        Ok(Self {
            image: RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255])),
            blend: BlendMode::Normal,
        })
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width() as f64, self.height() as f64)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Fills the whole canvas with an opaque color, ignoring blend mode.
    pub fn background(&mut self, color: Rgba) {
        let px = image::Rgba([color.r, color.g, color.b, 255]);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Blends `color` over every pixel with its alpha in normal mode.
    ///
    /// A low alpha leaves fading trails of previous frames.
    pub fn fade(&mut self, color: Rgba) {
        let alpha = color.a as f64 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let src = channels(color);
        for p in self.image.pixels_mut() {
            blend_pixel(p, src, alpha, BlendMode::Normal);
        }
    }

    /// Replaces the canvas with a field mapped through a palette.
    pub fn paint_field(&mut self, field: &Field, palette: &Palette) -> Result<(), FrescoError> {
        self.check_size(field)?;
        self.replace(field_to_rgba(field, palette))
    }

    /// Like [`Raster::paint_field`], with each pixel darkened by `shade`.
    pub fn paint_shaded_field(
        &mut self,
        field: &Field,
        shade: &Field,
        palette: &Palette,
    ) -> Result<(), FrescoError> {
        self.check_size(field)?;
        self.check_size(shade)?;
        self.replace(shaded_field_to_rgba(field, shade, palette))
    }

    fn check_size(&self, field: &Field) -> Result<(), FrescoError> {
        if field.width() != self.width() || field.height() != self.height() {
            return Err(FrescoError::DimensionMismatch {
                lhs_w: self.width(),
                lhs_h: self.height(),
                rhs_w: field.width(),
                rhs_h: field.height(),
            });
        }
        Ok(())
    }

    fn replace(&mut self, raw: Vec<u8>) -> Result<(), FrescoError> {
        self.image = RgbaImage::from_raw(self.image.width(), self.image.height(), raw)
            .ok_or_else(|| FrescoError::Io("RGBA buffer size mismatch".into()))?;
        Ok(())
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.image.get_pixel(x as u32, y as u32);
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    /// Blends one pixel. Points off the canvas are ignored.
    pub fn plot(&mut self, p: DVec2, color: Rgba) {
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let alpha = color.a as f64 / 255.0;
        blend_pixel(self.image.get_pixel_mut(x, y), channels(color), alpha, self.blend);
    }

    pub fn fill_rect(&mut self, min: DVec2, size: DVec2, color: Rgba) {
        let Some(mut mask) = Mask::covering(self, min, min + size) else {
            return;
        };
        let lo = (min - mask.origin).round();
        let hi = (min + size - mask.origin).round();
        for y in lo.y.max(0.0) as u32..(hi.y.max(0.0) as u32).min(mask.image.height()) {
            for x in lo.x.max(0.0) as u32..(hi.x.max(0.0) as u32).min(mask.image.width()) {
                mask.image.put_pixel(x, y, COVERED);
            }
        }
        self.composite(&mask, color);
    }

    /// Fills the interior of a closed shape. Open shapes are filled as if closed.
    pub fn fill_shape(&mut self, shape: &Shape, color: Rgba) {
        let Some((min, max)) = shape.bounds() else {
            return;
        };
        let Some(mut mask) = Mask::covering(self, min, max) else {
            return;
        };
        mask.polygon(shape.vertices());
        self.composite(&mask, color);
    }

    /// Strokes a shape's outline with the given line weight.
    ///
    /// The whole outline is rasterized into one mask first so translucent
    /// strokes do not darken where segments meet.
    pub fn stroke_shape(&mut self, shape: &Shape, color: Rgba, weight: f64) {
        let Some((min, max)) = shape.bounds() else {
            return;
        };
        let pad = DVec2::splat(weight * 0.5 + 1.0);
        let Some(mut mask) = Mask::covering(self, min - pad, max + pad) else {
            return;
        };
        for (a, b) in shape.segments() {
            mask.segment(a, b, weight);
        }
        self.composite(&mask, color);
    }

    pub fn line(&mut self, a: DVec2, b: DVec2, color: Rgba, weight: f64) {
        let pad = DVec2::splat(weight * 0.5 + 1.0);
        let Some(mut mask) = Mask::covering(self, a.min(b) - pad, a.max(b) + pad) else {
            return;
        };
        mask.segment(a, b, weight);
        self.composite(&mask, color);
    }

    pub fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if radius < 0.5 {
            self.plot(center, color);
            return;
        }
        let r = DVec2::splat(radius + 1.0);
        let Some(mut mask) = Mask::covering(self, center - r, center + r) else {
            return;
        };
        mask.disc(center, radius);
        self.composite(&mask, color);
    }

    /// Perceptual luminance in [0, 1]; 0 outside the canvas.
    pub fn luminance(&self, x: usize, y: usize) -> f64 {
        self.pixel(x, y).map(|p| p.luma()).unwrap_or(0.0)
    }

    /// Mean luminance of the pixels in `[x0, x1) x [y0, y1)`, clipped to the canvas.
    pub fn mean_luminance(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let (x1, y1) = (x1.min(self.width()), y1.min(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return 0.0;
        }
        let sum: f64 = (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .map(|(x, y)| self.luminance(x, y))
            .sum();
        sum / ((x1 - x0) * (y1 - y0)) as f64
    }

    fn composite(&mut self, mask: &Mask, color: Rgba) {
        let alpha = color.a as f64 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let src = channels(color);
        let (ox, oy) = (mask.origin.x as u32, mask.origin.y as u32);
        for (mx, my, coverage) in mask.image.enumerate_pixels() {
            if coverage[0] == 0 {
                continue;
            }
            let a = alpha * coverage[0] as f64 / 255.0;
            blend_pixel(self.image.get_pixel_mut(ox + mx, oy + my), src, a, self.blend);
        }
    }
}

/// Coverage mask over a canvas-clipped rectangle.
struct Mask {
    image: GrayImage,
    origin: DVec2,
}

impl Mask {
    /// Mask for the part of `[min, max]` that lies on the canvas, or `None`
    /// when nothing does.
    fn covering(raster: &Raster, min: DVec2, max: DVec2) -> Option<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let lo = min.floor().max(DVec2::ZERO);
        let hi = (max.ceil() + DVec2::ONE).min(raster.size());
        if hi.x <= lo.x || hi.y <= lo.y {
            return None;
        }
        let size = hi - lo;
        Some(Self {
            image: GrayImage::new(size.x as u32, size.y as u32),
            origin: lo,
        })
    }

    fn to_local(&self, p: DVec2) -> Point<i32> {
        let q = (p - self.origin).round();
        Point::new(q.x as i32, q.y as i32)
    }

    fn polygon(&mut self, vertices: &[DVec2]) {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(vertices.len());
        for &v in vertices {
            let p = self.to_local(v);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        // imageproc rejects polygons that repeat their first point at the end
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut self.image, &points, COVERED);
        } else if let [a, b] = points.as_slice() {
            draw_line_segment_mut(
                &mut self.image,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                COVERED,
            );
        }
    }

    fn segment(&mut self, a: DVec2, b: DVec2, weight: f64) {
        if weight < 1.5 {
            let (la, lb) = (a - self.origin, b - self.origin);
            draw_line_segment_mut(
                &mut self.image,
                (la.x as f32, la.y as f32),
                (lb.x as f32, lb.y as f32),
                COVERED,
            );
            return;
        }
        let half = weight * 0.5;
        let dir = b - a;
        if dir.length_squared() > 1e-12 {
            let n = dir.normalize().perp() * half;
            self.polygon(&[a + n, b + n, b - n, a - n]);
        }
        // round joins
        self.disc(a, half);
        self.disc(b, half);
    }

    fn disc(&mut self, center: DVec2, radius: f64) {
        let c = self.to_local(center);
        draw_filled_circle_mut(&mut self.image, (c.x, c.y), radius.round() as i32, COVERED);
    }
}

fn channels(color: Rgba) -> [f64; 3] {
    [
        color.r as f64 / 255.0,
        color.g as f64 / 255.0,
        color.b as f64 / 255.0,
    ]
}

fn blend_pixel(dst: &mut image::Rgba<u8>, src: [f64; 3], alpha: f64, mode: BlendMode) {
    for (c, s) in src.iter().enumerate() {
        let d = dst[c] as f64 / 255.0;
        let mixed = mode.mix(*s, d);
        let out = d + (mixed - d) * alpha;
        dst[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Rgba {
        Rgba::new(255, 0, 0, 255)
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(Raster::new(0, 10).is_err());
        assert!(Raster::new(10, 0).is_err());
    }

    #[test]
    fn new_canvas_is_opaque_black() {
        let r = Raster::new(4, 3).unwrap();
        assert_eq!((r.width(), r.height()), (4, 3));
        assert_eq!(r.pixel(3, 2), Some(Rgba::new(0, 0, 0, 255)));
        assert_eq!(r.pixel(4, 0), None);
    }

    #[test]
    fn fill_shape_covers_interior_only() {
        let mut r = Raster::new(20, 20).unwrap();
        r.fill_shape(&Shape::rect(DVec2::new(5.0, 5.0), DVec2::new(10.0, 10.0)), red());
        assert_eq!(r.pixel(10, 10), Some(red()));
        assert_eq!(r.pixel(1, 1), Some(Rgba::BLACK));
        assert_eq!(r.pixel(18, 18), Some(Rgba::BLACK));
    }

    #[test]
    fn shapes_partly_off_canvas_are_clipped() {
        let mut r = Raster::new(10, 10).unwrap();
        let c = Shape::circle(DVec2::new(0.0, 0.0), 6.0, 32).unwrap();
        r.fill_shape(&c, red());
        assert_eq!(r.pixel(1, 1), Some(red()));
        assert_eq!(r.pixel(9, 9), Some(Rgba::BLACK));
        // entirely off canvas is a no-op
        r.fill_shape(&c.translate(DVec2::splat(-100.0)), Rgba::WHITE);
        r.fill_circle(DVec2::splat(500.0), 5.0, Rgba::WHITE);
    }

    #[test]
    fn translucent_normal_blend_mixes() {
        let mut r = Raster::new(4, 4).unwrap();
        r.background(Rgba::WHITE);
        r.fill_rect(DVec2::ZERO, DVec2::splat(4.0), Rgba::new(0, 0, 0, 128));
        let p = r.pixel(1, 1).unwrap();
        assert!((120..=135).contains(&p.r), "got {p:?}");
        assert_eq!(p.a, 255);
    }

    #[test]
    fn additive_blend_accumulates() {
        let mut r = Raster::new(4, 4).unwrap();
        r.blend = BlendMode::Additive;
        let dim = Rgba::new(100, 100, 100, 255);
        r.plot(DVec2::new(1.0, 1.0), dim);
        r.plot(DVec2::new(1.0, 1.0), dim);
        assert_eq!(r.pixel(1, 1).unwrap().r, 200);
        r.plot(DVec2::new(1.0, 1.0), dim);
        assert_eq!(r.pixel(1, 1).unwrap().r, 255);
    }

    #[test]
    fn multiply_and_screen() {
        let mut r = Raster::new(2, 1).unwrap();
        r.background(Rgba::new(128, 128, 128, 255));
        r.blend = BlendMode::Multiply;
        r.plot(DVec2::new(0.0, 0.0), Rgba::new(128, 128, 128, 255));
        r.blend = BlendMode::Screen;
        r.plot(DVec2::new(1.0, 0.0), Rgba::new(128, 128, 128, 255));
        let m = r.pixel(0, 0).unwrap().r;
        let s = r.pixel(1, 0).unwrap().r;
        assert!(m < 128 && s > 128, "multiply {m}, screen {s}");
    }

    #[test]
    fn fade_moves_toward_color() {
        let mut r = Raster::new(2, 2).unwrap();
        r.background(Rgba::WHITE);
        for _ in 0..50 {
            r.fade(Rgba::new(0, 0, 0, 40));
        }
        assert!(r.luminance(0, 0) < 0.05);
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut r = Raster::new(40, 40).unwrap();
        let sq = Shape::rect(DVec2::new(5.0, 5.0), DVec2::new(30.0, 30.0));
        r.stroke_shape(&sq, Rgba::WHITE, 3.0);
        assert_eq!(r.pixel(20, 20), Some(Rgba::BLACK));
        assert_eq!(r.pixel(5, 20), Some(Rgba::WHITE));
        assert_eq!(r.pixel(20, 35), Some(Rgba::WHITE));
    }

    #[test]
    fn hairline_stroke_is_drawn() {
        let mut r = Raster::new(10, 10).unwrap();
        r.line(DVec2::new(0.0, 5.0), DVec2::new(9.0, 5.0), Rgba::WHITE, 1.0);
        assert_eq!(r.pixel(4, 5), Some(Rgba::WHITE));
        assert_eq!(r.pixel(4, 2), Some(Rgba::BLACK));
    }

    #[test]
    fn degenerate_polygons_do_not_panic() {
        let mut r = Raster::new(10, 10).unwrap();
        let dot = Shape::polygon(vec![DVec2::splat(3.0), DVec2::splat(3.1), DVec2::splat(3.2)]);
        r.fill_shape(&dot, Rgba::WHITE);
        let closed_twice = Shape::polygon(vec![
            DVec2::new(1.0, 1.0),
            DVec2::new(8.0, 1.0),
            DVec2::new(8.0, 8.0),
            DVec2::new(1.0, 1.0),
        ]);
        r.fill_shape(&closed_twice, Rgba::WHITE);
        assert_eq!(r.pixel(7, 3), Some(Rgba::WHITE));
    }

    #[test]
    fn mean_luminance_of_half_white_canvas() {
        let mut r = Raster::new(10, 10).unwrap();
        r.fill_rect(DVec2::ZERO, DVec2::new(5.0, 10.0), Rgba::WHITE);
        let m = r.mean_luminance(0, 0, 10, 10);
        assert!((m - 0.5).abs() < 0.01, "mean {m}");
        assert_eq!(r.mean_luminance(5, 5, 5, 9), 0.0);
    }

    #[test]
    fn paint_field_requires_matching_size() {
        let mut r = Raster::new(4, 4).unwrap();
        let palette = Palette::from_name("mono").unwrap();
        assert!(r.paint_field(&Field::filled(4, 4, 1.0).unwrap(), &palette).is_ok());
        assert!(r.luminance(2, 2) > 0.95);
        assert!(r.paint_field(&Field::new(3, 4).unwrap(), &palette).is_err());
    }

    #[test]
    fn shaded_field_darkens_by_shade() {
        let mut r = Raster::new(4, 2).unwrap();
        let palette = Palette::from_name("mono").unwrap();
        let tone = Field::filled(4, 2, 1.0).unwrap();
        let shade = Field::from_fn(4, 2, |x, _| x as f64 / 3.0).unwrap();
        r.paint_shaded_field(&tone, &shade, &palette).unwrap();
        assert!(r.luminance(0, 0) < 0.01);
        assert!(r.luminance(3, 1) > 0.95);
        assert!(r.luminance(1, 0) < r.luminance(2, 0));
        let small = Field::new(2, 2).unwrap();
        assert!(r.paint_shaded_field(&tone, &small, &palette).is_err());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drawing_anywhere_keeps_the_canvas_opaque(
                x in -50.0_f64..100.0,
                y in -50.0_f64..100.0,
                r in 0.0_f64..40.0,
                weight in 0.0_f64..8.0,
                alpha in 0u8..=255,
            ) {
                let mut raster = Raster::new(32, 24).unwrap();
                raster.blend = BlendMode::Additive;
                let color = Rgba::new(200, 120, 40, alpha);
                let c = DVec2::new(x, y);
                raster.fill_circle(c, r, color);
                raster.line(c, c + DVec2::new(r, -r), color, weight);
                raster.fill_rect(c, DVec2::splat(r), color);
                raster.plot(c, color);
                prop_assert!(raster.image().pixels().all(|p| p[3] == 255));
            }
        }
    }
}
