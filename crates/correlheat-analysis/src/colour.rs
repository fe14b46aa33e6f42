//! Blue-white-red colour scale for correlation values.
//!
//! The scale has two linear segments: [-1, 0] runs from [`Rgb::BLUE`] to
//! [`Rgb::WHITE`] and [0, 1] from [`Rgb::WHITE`] to [`Rgb::RED`]. Undefined
//! correlations map to [`Rgb::MISSING`], a grey that lies on neither
//! segment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit-per-channel RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Colour for a correlation of -1.
    pub const BLUE: Self = Self::new(33, 102, 172);
    /// Colour for a correlation of 0.
    pub const WHITE: Self = Self::new(247, 247, 247);
    /// Colour for a correlation of +1.
    pub const RED: Self = Self::new(178, 24, 43);
    /// Placeholder for undefined correlations.
    pub const MISSING: Self = Self::new(160, 160, 160);

    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex representation, e.g. `#2166ac`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness in [0, 255] (ITU-R BT.601 weights).
    ///
    /// Renderers use this to pick a readable text colour.
    pub fn luminance(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    fn lerp(start: Self, end: Self, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * fraction;
            // Round half up; the clamp keeps the cast in range.
            (v + 0.5).floor().clamp(0.0, 255.0) as u8
        };
        Self::new(
            channel(start.r, end.r),
            channel(start.g, end.g),
            channel(start.b, end.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Map a correlation to its display colour.
///
/// `None` (and NaN) map to [`Rgb::MISSING`]. Finite values outside [-1, 1]
/// are clamped first.
pub fn correlation_colour(value: Option<f64>) -> Rgb {
    match value {
        Some(v) if !v.is_nan() => {
            let v = v.clamp(-1.0, 1.0);
            if v >= 0.0 {
                Rgb::lerp(Rgb::WHITE, Rgb::RED, v)
            } else {
                Rgb::lerp(Rgb::BLUE, Rgb::WHITE, 1.0 + v)
            }
        }
        _ => Rgb::MISSING,
    }
}

/// A labelled point on the colour legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendStop {
    /// Correlation value.
    pub value: f64,
    /// Position along the legend in [0, 1].
    pub position: f64,
    /// Colour at this value.
    pub colour: Rgb,
}

/// Legend stops at -1, -0.5, 0, 0.5 and 1.
pub fn legend_stops() -> Vec<LegendStop> {
    [-1.0, -0.5, 0.0, 0.5, 1.0]
        .into_iter()
        .map(|value| LegendStop {
            value,
            position: (value + 1.0) / 2.0,
            colour: correlation_colour(Some(value)),
        })
        .collect()
}
