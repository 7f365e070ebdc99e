//! CSS color parsing shared by every rendering backend.
//!
//! Accepts the forms the editor UI produces (`#RGB`, `#RRGGBB`, with or
//! without an alpha nibble/byte), functional `rgb()` / `rgba()`, and a small
//! table of named colors. Anything else is rejected so callers can decide
//! whether to fall back or skip the element.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::fmt;

/// An 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a CSS color string. Returns `None` for unsupported syntax.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(args) = lower.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
            return parse_functional(args, true);
        }
        if let Some(args) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            return parse_functional(args, false);
        }
        named(&lower)
    }

    /// Channels scaled to `0.0..=1.0`, in the order PDF color operators expect.
    #[must_use]
    pub fn unit_rgb(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Alpha scaled to `0.0..=1.0`.
    #[must_use]
    pub fn unit_alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// CSS `rgba(...)` form for the browser 2D context.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.unit_alpha())
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Whether `raw` is a color this module can parse.
#[must_use]
pub fn is_valid(raw: &str) -> bool {
    Rgba::parse(raw).is_some()
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 | 4 => {
            let mut channels = [255u8; 4];
            for (i, c) in hex.chars().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let nibble = c.to_digit(16)? as u8;
                channels[i] = nibble * 17;
            }
            Some(Rgba { r: channels[0], g: channels[1], b: channels[2], a: channels[3] })
        }
        6 | 8 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            let r = byte(0);
            let g = byte(2);
            let b = byte(4);
            let a = if hex.len() == 8 { byte(6) } else { Ok(255) };
            match (r, g, b, a) {
                (Ok(r), Ok(g), Ok(b), Ok(a)) => Some(Rgba { r, g, b, a }),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let channel = |s: &str| to_channel(s.parse::<f64>().unwrap_or(f64::NAN));
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let v = parts[3].parse::<f64>().unwrap_or(f64::NAN);
        if !(0.0..=1.0).contains(&v) {
            return None;
        }
        to_channel(v * 255.0)?
    } else {
        255
    };
    Some(Rgba { r, g, b, a })
}

fn to_channel(v: f64) -> Option<u8> {
    if v.is_finite() && (0.0..=255.0).contains(&v) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = v.round() as u8;
        Some(channel)
    } else {
        None
    }
}

fn named(name: &str) -> Option<Rgba> {
    let rgba = match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "lime" => Rgba::opaque(0, 255, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "yellow" => Rgba::opaque(255, 255, 0),
        "orange" => Rgba::opaque(255, 165, 0),
        "purple" => Rgba::opaque(128, 0, 128),
        "pink" => Rgba::opaque(255, 192, 203),
        "brown" => Rgba::opaque(165, 42, 42),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "silver" => Rgba::opaque(192, 192, 192),
        "navy" => Rgba::opaque(0, 0, 128),
        "teal" => Rgba::opaque(0, 128, 128),
        "cyan" | "aqua" => Rgba::opaque(0, 255, 255),
        "magenta" | "fuchsia" => Rgba::opaque(255, 0, 255),
        "transparent" => Rgba { r: 0, g: 0, b: 0, a: 0 },
        _ => return None,
    };
    Some(rgba)
}
