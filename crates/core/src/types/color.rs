//! Hex color type used for overlay text.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`HexColor`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("color must have 3 or 6 hex digits (got {0})")]
    BadLength(usize),
    #[error("invalid hex digit in color")]
    InvalidDigit,
}

/// An opaque RGB color written as `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the leading `#` is missing, the digit count is not
    /// 3 or 6, or a digit is not hexadecimal.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit);
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| ColorError::InvalidDigit);

        match digits.len() {
            3 => {
                let expand = |i: usize| {
                    let digit = digits.get(i..=i).ok_or(ColorError::InvalidDigit)?;
                    channel(&digit.repeat(2))
                };
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(digits.get(0..2).ok_or(ColorError::InvalidDigit)?)?,
                channel(digits.get(2..4).ok_or(ColorError::InvalidDigit)?)?,
                channel(digits.get(4..6).ok_or(ColorError::InvalidDigit)?)?,
            )),
            n => Err(ColorError::BadLength(n)),
        }
    }

    /// Parse a color, falling back to white for anything unparsable.
    #[must_use]
    pub fn parse_or_white(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::WHITE)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl std::str::FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        assert_eq!(HexColor::parse("#ef4444"), Ok(HexColor::rgb(0xef, 0x44, 0x44)));
        assert_eq!(HexColor::parse("#FFFFFF"), Ok(HexColor::WHITE));
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(HexColor::parse("#f00"), Ok(HexColor::rgb(0xff, 0, 0)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(HexColor::parse("ffffff"), Err(ColorError::MissingHash));
        assert_eq!(HexColor::parse("#ffff"), Err(ColorError::BadLength(4)));
        assert_eq!(HexColor::parse("#gggggg"), Err(ColorError::InvalidDigit));
    }

    #[test]
    fn test_parse_or_white() {
        assert_eq!(HexColor::parse_or_white("blue"), HexColor::WHITE);
        assert_eq!(HexColor::parse_or_white("#000"), HexColor::BLACK);
    }

    #[test]
    fn test_display_roundtrip() {
        let color = HexColor::rgb(0x3b, 0x82, 0xf6);
        assert_eq!(color.to_string(), "#3b82f6");
        assert_eq!(HexColor::parse(&color.to_string()), Ok(color));
    }
}
