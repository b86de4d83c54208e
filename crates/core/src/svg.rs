//! Plain SVG export of shape outlines.
//!
//! Produces one `<path>` per shape with a black stroke and no fill, which is
//! what pen plotters and vector editors expect from line art.

use std::fmt::Write;

use crate::shape::Shape;

/// Renders `shapes` into an SVG document sized `width` x `height` user units.
///
/// Shapes with fewer than two vertices are skipped. Closed shapes end in `Z`.
pub fn to_svg(width: usize, height: usize, shapes: &[Shape], stroke_width: f64) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        out,
        r#"<g fill="none" stroke="black" stroke-width="{stroke_width}" stroke-linecap="round" stroke-linejoin="round">"#
    );
    for shape in shapes.iter().filter(|s| s.len() >= 2) {
        let _ = writeln!(out, r#"<path d="{}"/>"#, path_data(shape));
    }
    out.push_str("</g>\n</svg>\n");
    out
}

/// SVG path data (`M x y L x y ... [Z]`) for one shape.
pub fn path_data(shape: &Shape) -> String {
    let mut d = String::new();
    for (i, v) in shape.vertices().iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{:.2} {:.2} ", v.x, v.y);
    }
    if shape.is_closed() {
        d.push('Z');
    }
    d.trim_end().to_string()
}
