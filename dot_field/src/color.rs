//! RGBA colors and the handful of operations the field needs on them.
//!
//! Channels are stored as `f32` in `0.0..=255.0` so exponential interpolation
//! can approach a target smoothly without rounding to a standstill.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// Rgba
// ════════════════════════════════════════════════════════════════════════════

/// A color with straight (non-premultiplied) alpha.
///
/// Serialized as a hex string (`"#207FFF"` or `"#207FFF80"`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255.0, 255.0, 255.0);
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Rgba { r, g, b, a: 255.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn gray(v: f32) -> Self {
        Rgba::rgb(v, v, v)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(f32::from)
                .map_err(|_| bad())
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255.0 };
        Ok(Rgba::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Hue wheel constructor; `h` in degrees, `s` and `v` in `0.0..=1.0`.
    /// Channels are rounded so the result survives a trip through hex.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h  = h.rem_euclid(360.0);
        let hi = (h / 60.0) as u32;
        let f  = h / 60.0 - hi as f32;
        let p  = v * (1.0 - s);
        let q  = v * (1.0 - s * f);
        let t  = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match hi {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Rgba::rgb((r * 255.0).round(), (g * 255.0).round(), (b * 255.0).round())
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Rgba { a: a.clamp(0.0, 255.0), ..self }
    }

    /// Linear interpolation; `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Euclidean distance over all four channels.
    pub fn distance(self, other: Rgba) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        let da = self.a - other.a;
        (dr * dr + dg * dg + db * db + da * da).sqrt()
    }

    /// Pack into `0xAARRGGBB`.
    pub fn to_argb(self) -> u32 {
        let q = |c: f32| c.round().clamp(0.0, 255.0) as u32;
        (q(self.a) << 24) | (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = |c: f32| c.round().clamp(0.0, 255.0) as u8;
        write!(f, "#{:02X}{:02X}{:02X}", q(self.r), q(self.g), q(self.b))?;
        if q(self.a) != 255 {
            write!(f, "{:02X}", q(self.a))?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Rgba {
    type Error = ConfigError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&s)
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> String {
        c.to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
