//! Tint Colors
//!
//! RGB/HSV conversion and health-based tint interpolation.
//! These are presentation values and are the one place floats are used;
//! they never feed back into the simulation.

use serde::{Serialize, Deserialize};

/// RGB color with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

/// HSV color with hue, saturation and value in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Hsv {
    /// Hue (0 = red, wraps at 1)
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Value
    pub v: f32,
}

impl Rgb {
    /// White
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a color from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Check that every component is a finite value in [0, 1].
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Convert to HSV.
    pub fn to_hsv(self) -> Hsv {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;

        let v = max;
        let s = if max > 0.0 { delta / max } else { 0.0 };

        let h = if delta <= 0.0 {
            0.0
        } else if max == self.r {
            let h = (self.g - self.b) / delta / 6.0;
            if h < 0.0 { h + 1.0 } else { h }
        } else if max == self.g {
            ((self.b - self.r) / delta + 2.0) / 6.0
        } else {
            ((self.r - self.g) / delta + 4.0) / 6.0
        };

        Hsv { h, s, v }
    }
}

impl Hsv {
    /// Convert to RGB.
    pub fn to_rgb(self) -> Rgb {
        if self.s <= 0.0 {
            return Rgb::new(self.v, self.v, self.v);
        }

        let h = (self.h - self.h.floor()) * 6.0;
        let sector = h.floor();
        let f = h - sector;

        let p = self.v * (1.0 - self.s);
        let q = self.v * (1.0 - self.s * f);
        let t = self.v * (1.0 - self.s * (1.0 - f));

        match sector as u8 {
            0 => Rgb::new(self.v, t, p),
            1 => Rgb::new(q, self.v, p),
            2 => Rgb::new(p, self.v, t),
            3 => Rgb::new(p, q, self.v),
            4 => Rgb::new(t, p, self.v),
            _ => Rgb::new(self.v, p, q),
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate between two colors in HSV space.
///
/// `t = 0` gives `from`, `t = 1` gives `to`; `t` is clamped to [0, 1].
/// Hue is interpolated linearly without wrapping.
pub fn lerp_hsv(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let a = from.to_hsv();
    let b = to.to_hsv();

    Hsv {
        h: lerp(a.h, b.h, t),
        s: lerp(a.s, b.s, t),
        v: lerp(a.v, b.v, t),
    }
    .to_rgb()
}

/// Full-health and zero-health colors for a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TintRange {
    /// Color at full health
    pub full_health: Rgb,
    /// Color at zero health
    pub zero_health: Rgb,
}

impl TintRange {
    /// Tint for a health fraction in [0, 1].
    pub fn at(&self, health_fraction: f32) -> Rgb {
        lerp_hsv(self.zero_health, self.full_health, health_fraction)
    }
}

impl Default for TintRange {
    fn default() -> Self {
        Self {
            full_health: Rgb::new(0.2, 0.6, 1.0),
            zero_health: Rgb::new(0.3, 0.3, 0.3),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
