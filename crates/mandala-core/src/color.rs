//! Color representation and the hex arithmetic used by chart themes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color with values in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component [0.0, 1.0]
    pub r: f32,
    /// Green component [0.0, 1.0]
    pub g: f32,
    /// Blue component [0.0, 1.0]
    pub b: f32,
    /// Alpha component [0.0, 1.0]
    pub a: f32,
}

impl Color {
    /// Create a new color, clamping values to [0.0, 1.0].
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create an opaque color from RGB values.
    #[must_use]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Parse a hex color string (e.g., "#ff0000" or "ff0000").
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        Ok(Rgb::parse(hex)?.into())
    }

    /// Parse a CSS color value as the chart stylesheet writes them.
    ///
    /// Accepts hex colors plus the keywords `white`, `black` and
    /// `transparent`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keywords or malformed hex.
    pub fn parse_css(value: &str) -> Result<Self, ColorParseError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Self::WHITE),
            "black" => Ok(Self::BLACK),
            "transparent" => Ok(Self::TRANSPARENT),
            other if other.starts_with('#') || other.len() == 6 => Self::from_hex(other),
            other => Err(ColorParseError::UnknownKeyword(other.to_string())),
        }
    }

    /// Convert to hex string (RGB only).
    #[must_use]
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        Rgb { r, g, b }.to_hex()
    }

    /// Convert to 8-bit RGBA channels.
    #[must_use]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// Black color
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// White color
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Transparent color
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::rgb(
            f32::from(rgb.r) / 255.0,
            f32::from(rgb.g) / 255.0,
            f32::from(rgb.b) / 255.0,
        )
    }
}

/// An opaque color with 8-bit integer channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Parse exactly six hex digits, with or without a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns an error for any other length or for non-hex characters.
    pub fn parse(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ColorParseError::InvalidLength(digits.len()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex);
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError::InvalidHex)
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Encode as `#rrggbb` with lowercase, zero-padded digits.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale every channel by `(100 - percent) / 100`, rounding down.
    ///
    /// Results are clamped to [0, 255], so a negative `percent` lightens
    /// without wrapping.
    #[must_use]
    pub fn darken(&self, percent: i32) -> Self {
        let scale = |channel: u8| {
            let scaled = (i64::from(channel) * i64::from(100 - percent)).div_euclid(100);
            scaled.clamp(0, 255) as u8
        };
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

/// Darken a hex color by a percentage and re-encode it as `#rrggbb`.
///
/// ```
/// use mandala_core::darken;
///
/// assert_eq!(darken("#28a745", 40).unwrap(), "#186429");
/// assert_eq!(darken("007BFF", 0).unwrap(), "#007bff");
/// assert_eq!(darken("#ffffff", 100).unwrap(), "#000000");
/// ```
///
/// # Errors
///
/// Returns an error if `hex` is not a 6-digit hex color.
pub fn darken(hex: &str, percent: i32) -> Result<String, ColorParseError> {
    Ok(Rgb::parse(hex)?.darken(percent).to_hex())
}

/// Canonical lowercase `#rrggbb` form of a hex color.
///
/// # Errors
///
/// Returns an error if `hex` is not a 6-digit hex color.
pub fn normalize(hex: &str) -> Result<String, ColorParseError> {
    darken(hex, 0)
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Invalid hex characters
    #[error("invalid hex characters")]
    InvalidHex,
    /// Invalid string length
    #[error("invalid hex string length {0} (expected 6)")]
    InvalidLength(usize),
    /// Not a color keyword we understand
    #[error("unknown color keyword '{0}'")]
    UnknownKeyword(String),
}
