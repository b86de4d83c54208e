//! Pixel buffer conversion from [`Field`] + [`Palette`].

use fresco_core::{Field, Palette, Rgba};

/// Maps field values through a palette to an opaque RGBA8 buffer of length
/// `width * height * 4`.
pub fn field_to_rgba(field: &Field, palette: &Palette) -> Vec<u8> {
    field
        .data()
        .iter()
        .flat_map(|&t| Rgba::from(palette.sample(t)).to_array())
        .collect()
}

/// Like [`field_to_rgba`], but each value is darkened by the matching `shade`
/// value: 0 is black, 1 leaves the palette color as is.
pub fn shaded_field_to_rgba(field: &Field, shade: &Field, palette: &Palette) -> Vec<u8> {
    field
        .data()
        .iter()
        .zip(shade.data())
        .flat_map(|(&t, &s)| {
            let c = Rgba::from(palette.sample(t));
            let k = |v: u8| (v as f64 * s).round() as u8;
            [k(c.r), k(c.g), k(c.b), 255]
        })
        .collect()
}
