//! RGBA colors
//!
//! Serialized as CSS hex strings (`"#22c55e"`, `"#22c55e80"`) so branding
//! JSON stays readable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 - 1.0
    pub a: f32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From 0xRRGGBB
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse `#rrggbb` / `#rrggbbaa` (leading `#` optional)
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? as f32 / 255.0 } else { 1.0 };
        Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }

    /// CSS color string for Canvas2D
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a.max(0.0))
        }
    }

    fn to_hex_string(self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_hex_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Color::parse("#22c55e"), Ok(Color::from_hex(0x22c55e)));
        let c = Color::parse("ff000080").unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert!((c.a - 0.502).abs() < 0.01);
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn test_css() {
        assert_eq!(Color::from_hex(0x0a0b0c).to_css(), "#0a0b0c");
        assert_eq!(Color::rgb(1, 2, 3).with_alpha(0.5).to_css(), "rgba(1,2,3,0.500)");
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&Color::from_hex(0x16a34a)).unwrap();
        assert_eq!(json, "\"#16a34a\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::from_hex(0x16a34a));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
