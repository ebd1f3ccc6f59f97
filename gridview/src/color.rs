//! CSS-style colors.
//!
//! Parsing happens at the caller's boundary (`"red".parse::<Color>()`); every drawing call
//! then receives a concrete RGBA value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const GRID_LINE: Color = Color::rgb(0x2a, 0x2a, 0x2a);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "silver" => Color::rgb(192, 192, 192),
        "red" => Color::rgb(255, 0, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "navy" => Color::rgb(0, 0, 128),
        "yellow" => Color::rgb(255, 255, 0),
        "olive" => Color::rgb(128, 128, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "teal" => Color::rgb(0, 128, 128),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "purple" => Color::rgb(128, 0, 128),
        "orange" => Color::rgb(255, 165, 0),
        "gold" => Color::rgb(255, 215, 0),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(165, 42, 42),
        "transparent" => Color::TRANSPARENT,
        _ => return None,
    };
    Some(c)
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn parse_hex(digits: &str) -> Option<Color> {
    let bytes = digits.as_bytes();
    let nibbles: Option<Vec<u8>> = bytes.iter().copied().map(hex_digit).collect();
    let n = nibbles?;
    match n.len() {
        3 | 4 => {
            let expand = |v: u8| v * 17;
            let a = n.get(3).copied().map(expand).unwrap_or(255);
            Some(Color::rgba(expand(n[0]), expand(n[1]), expand(n[2]), a))
        }
        6 | 8 => {
            let byte = |i: usize| n[i] * 16 + n[i + 1];
            let a = if n.len() == 8 { byte(6) } else { 255 };
            Some(Color::rgba(byte(0), byte(2), byte(4), a))
        }
        _ => None,
    }
}

fn parse_functional(s: &str) -> Option<Color> {
    let (args, with_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
        (rest, true)
    } else if let Some(rest) = s.strip_prefix("rgb(") {
        (rest, false)
    } else {
        return None;
    };
    let args = args.strip_suffix(')')?;
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |p: &str| p.parse::<u16>().ok().map(|v| v.min(255) as u8);
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let alpha = parts[3].parse::<f32>().ok()?;
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Some(Color::rgba(r, g, b, a))
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let parsed = match normalized.strip_prefix('#') {
            Some(digits) => parse_hex(digits),
            None => named(&normalized).or_else(|| parse_functional(&normalized)),
        };
        parsed.ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_hex_forms() {
        assert_eq!("red".parse::<Color>(), Ok(Color::rgb(255, 0, 0)));
        assert_eq!(" Gray ".parse::<Color>(), Ok(Color::GRAY));
        assert_eq!("#2a2a2a".parse::<Color>(), Ok(Color::GRID_LINE));
        assert_eq!("#f00".parse::<Color>(), Ok(Color::rgb(255, 0, 0)));
        assert_eq!("#ff000080".parse::<Color>(), Ok(Color::rgba(255, 0, 0, 128)));
        assert_eq!("transparent".parse::<Color>(), Ok(Color::TRANSPARENT));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!("rgb(1, 2, 3)".parse::<Color>(), Ok(Color::rgb(1, 2, 3)));
        assert_eq!(
            "rgba(10,20,30,0.5)".parse::<Color>(),
            Ok(Color::rgba(10, 20, 30, 128))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12".parse::<Color>().is_err());
        assert!("rgb(1,2)".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn serializes_as_css_string() {
        let json = serde_json::to_string(&Color::GRID_LINE).unwrap();
        assert_eq!(json, "\"#2a2a2a\"");
        let back: Color = serde_json::from_str("\"rgba(0,0,0,0)\"").unwrap();
        assert_eq!(back, Color::TRANSPARENT);
    }
}
