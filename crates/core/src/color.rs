//! Colors used by sketches and palettes.
//!
//! Sketches think in sRGB (hex strings, HSB picks) but palettes interpolate
//! in OKLCh so gradients stay perceptually even. [`Rgba`] is the 8-bit
//! paint value handed to the raster.

use crate::error::FrescoError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1]. Serializes as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Gamma-decoded RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Cylindrical OKLab. Hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// 8-bit RGBA paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha replaced by `alpha` in [0, 1].
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: unit_to_byte(alpha),
            ..self
        }
    }

    /// Rec. 601 luma in [0, 1], ignoring alpha.
    pub fn luma(self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Srgb> for Rgba {
    fn from(c: Srgb) -> Self {
        Rgba::new(unit_to_byte(c.r), unit_to_byte(c.g), unit_to_byte(c.b), 255)
    }
}

fn unit_to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Srgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parses `"#ff00aa"` or `"ff00aa"`, case insensitive.
    pub fn from_hex(hex: &str) -> Result<Srgb, FrescoError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(FrescoError::InvalidColor(format!(
                "expected 6 hex digits in {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| FrescoError::InvalidColor(format!("invalid {name} in {hex:?}: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    pub fn to_hex(self) -> String {
        let Rgba { r, g, b, .. } = Rgba::from(self);
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Converts hue (degrees), saturation and brightness (both [0, 1]) to sRGB.
    pub fn from_hsb(hue: f64, saturation: f64, brightness: f64) -> Srgb {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        Srgb::new(r + m, g + m, b + m)
    }

    pub fn to_linear(self) -> LinearRgb {
        LinearRgb {
            r: decode_gamma(self.r),
            g: decode_gamma(self.g),
            b: decode_gamma(self.b),
        }
    }

    pub fn to_oklch(self) -> OkLch {
        self.to_linear().to_oklab().to_oklch()
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn decode_gamma(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn encode_gamma(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl LinearRgb {
    pub fn to_srgb(self) -> Srgb {
        Srgb {
            r: encode_gamma(self.r),
            g: encode_gamma(self.g),
            b: encode_gamma(self.b),
        }
    }

    pub fn to_oklab(self) -> OkLab {
        let l = (0.4122214708 * self.r + 0.5363325363 * self.g + 0.0514459929 * self.b).cbrt();
        let m = (0.2119034982 * self.r + 0.6806995451 * self.g + 0.1073969566 * self.b).cbrt();
        let s = (0.0883024619 * self.r + 0.2817188376 * self.g + 0.6299787005 * self.b).cbrt();
        OkLab {
            l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
            a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
            b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
        }
    }
}

impl OkLab {
    pub fn to_linear(self) -> LinearRgb {
        let l = (self.l + 0.3963377774 * self.a + 0.2158037573 * self.b).powi(3);
        let m = (self.l - 0.1055613458 * self.a - 0.0638541728 * self.b).powi(3);
        let s = (self.l - 0.0894841775 * self.a - 1.2914855480 * self.b).powi(3);
        LinearRgb {
            r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
            g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
            b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
        }
    }

    /// Hue is pinned to 0 for achromatic colors so grays never produce NaN.
    pub fn to_oklch(self) -> OkLch {
        let c = self.a.hypot(self.b);
        let h = if c < 1e-10 {
            0.0
        } else {
            self.b.atan2(self.a).to_degrees().rem_euclid(360.0)
        };
        OkLch { l: self.l, c, h }
    }
}

impl OkLch {
    pub fn to_oklab(self) -> OkLab {
        let (sin, cos) = self.h.to_radians().sin_cos();
        OkLab {
            l: self.l,
            a: self.c * cos,
            b: self.c * sin,
        }
    }

    /// Converts to sRGB, clamping out-of-gamut results into [0, 1].
    pub fn to_srgb(self) -> Srgb {
        let c = self.to_oklab().to_linear().to_srgb();
        Srgb {
            r: c.r.clamp(0.0, 1.0),
            g: c.g.clamp(0.0, 1.0),
            b: c.b.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn close(a: Srgb, b: Srgb, eps: f64) -> bool {
        (a.r - b.r).abs() < eps && (a.g - b.g).abs() < eps && (a.b - b.b).abs() < eps
    }

    #[test]
    fn hex_parses_with_and_without_hash() {
        let a = Srgb::from_hex("#FF8000").unwrap();
        let b = Srgb::from_hex("ff8000").unwrap();
        assert_eq!(a, b);
        assert!((a.r - 1.0).abs() < EPSILON);
        assert!((a.g - 128.0 / 255.0).abs() < EPSILON);
        assert_eq!(a.b, 0.0);
    }

    #[test]
    fn hex_rejects_bad_input() {
        for bad in ["", "#fff", "#gg0000", "#12345678", "#ééé"] {
            assert!(
                matches!(Srgb::from_hex(bad), Err(FrescoError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(Srgb::from_hex("#3a7bd5").unwrap().to_hex(), "#3a7bd5");
    }

    #[test]
    fn hsb_primaries() {
        assert!(close(Srgb::from_hsb(0.0, 1.0, 1.0), Srgb::new(1.0, 0.0, 0.0), EPSILON));
        assert!(close(Srgb::from_hsb(120.0, 1.0, 1.0), Srgb::new(0.0, 1.0, 0.0), EPSILON));
        assert!(close(Srgb::from_hsb(240.0, 1.0, 1.0), Srgb::new(0.0, 0.0, 1.0), EPSILON));
        assert!(close(Srgb::from_hsb(360.0, 1.0, 1.0), Srgb::new(1.0, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn hsb_zero_saturation_is_gray() {
        let c = Srgb::from_hsb(200.0, 0.0, 0.5);
        assert!(close(c, Srgb::new(0.5, 0.5, 0.5), EPSILON));
    }

    #[test]
    fn oklch_round_trip_preserves_color() {
        for hex in ["#ff0000", "#00ff00", "#0000ff", "#808080", "#c08040"] {
            let c = Srgb::from_hex(hex).unwrap();
            let back = c.to_oklch().to_srgb();
            assert!(close(c, back, 1e-4), "{hex} came back as {}", back.to_hex());
        }
    }

    #[test]
    fn gray_has_zero_hue() {
        let lch = Srgb::new(0.5, 0.5, 0.5).to_oklch();
        assert_eq!(lch.h, 0.0);
        assert!(lch.c < 1e-6);
    }

    #[test]
    fn rgba_luma_extremes() {
        assert_eq!(Rgba::BLACK.luma(), 0.0);
        assert!((Rgba::WHITE.luma() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rgba_with_alpha_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(0.5).a, 128);
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 255);
        assert_eq!(Rgba::WHITE.with_alpha(-1.0).a, 0);
    }

    #[test]
    fn srgb_serializes_as_hex_string() {
        let json = serde_json::to_string(&Srgb::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#ff0000");
    }
}
