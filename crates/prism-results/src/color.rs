//! Deterministic, light node colors keyed by type label.
//!
//! A label's color is derived from the BLAKE3 digest of the label, so the same
//! label gets the same color in every projection and every process. The
//! palette only caches what it has already computed.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// An `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// The color assigned to `label`.
    pub fn for_label(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let bytes = digest.as_bytes();

        let hue = f64::from(u16::from_be_bytes([bytes[0], bytes[1]]) % 360);
        let saturation = 0.55 + f64::from(bytes[2]) / 255.0 * 0.35;
        let lightness = 0.72 + f64::from(bytes[3]) / 255.0 * 0.13;

        let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels.
    pub fn channels(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            self.0
                .get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label → color cache for one projection (or longer, if the caller keeps it).
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    assigned: HashMap<String, Color>,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `label`, computing and caching it on first use.
    pub fn color_for(&mut self, label: &str) -> Color {
        if let Some(color) = self.assigned.get(label) {
            return color.clone();
        }
        let color = Color::for_label(label);
        tracing::trace!(label, color = %color, "Assigned type color");
        self.assigned.insert(label.to_string(), color.clone());
        color
    }

    pub fn get(&self, label: &str) -> Option<&Color> {
        self.assigned.get(label)
    }

    /// Number of labels with an assigned color.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// `hue` in degrees, `saturation` and `lightness` in 0..=1.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = lightness - chroma / 2.0;
    let to_byte = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r1), to_byte(g1), to_byte(b1))
}
