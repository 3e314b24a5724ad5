//! RGB colours parsed from CSS-style hex strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("colour '{0}' must start with '#'")]
    MissingHash(String),
    #[error("colour '{0}' must have 3 or 6 hex digits")]
    BadLength(String),
    #[error("colour '{0}' contains a non-hex digit")]
    BadDigit(String),
}

/// Linear 0..1 RGB colour. Serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` integer.
    pub fn from_u32(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ColorError::BadLength(s.to_string())),
        };
        let value =
            u32::from_str_radix(&expanded, 16).map_err(|_| ColorError::BadDigit(s.to_string()))?;
        Ok(Self::from_u32(value))
    }

    pub fn to_u32(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        let blue = Color::from_hex("#006de0").unwrap();
        assert_eq!(blue.to_u32(), 0x006de0);
        assert_eq!(Color::from_hex("#ff0").unwrap().to_u32(), 0xffff00);
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!(Color::from_hex("006de0"), Err(ColorError::MissingHash(_))));
        assert!(matches!(Color::from_hex("#12345"), Err(ColorError::BadLength(_))));
        assert!(matches!(Color::from_hex("#zz0000"), Err(ColorError::BadDigit(_))));
    }

    #[test]
    fn hex_string_roundtrip_is_stable() {
        assert_eq!(Color::from_hex("#00f3ff").unwrap().to_hex(), "#00f3ff");
    }
}
