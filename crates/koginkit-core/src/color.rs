//! RGBA colors in the hexadecimal notation used by pattern files.
//!
//! Opaque colors print as `#rrggbb`; anything with alpha below 255 prints
//! as `#rrggbbaa`. Parsing accepts the short `#rgb` form as well.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Creates a color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }

    /// Hex digits without the leading `#`; this is the color half of a
    /// geometry id.
    pub fn hex_digits(&self) -> String {
        if self.is_opaque() {
            format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// The `#rrggbb` part, ignoring alpha.
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Splits the color into an RGB stroke and an opacity attribute value.
    ///
    /// Some SVG consumers ignore the alpha byte of `#rrggbbaa`, so translucent
    /// colors are written as `#rrggbb` plus `opacity`. Opaque colors have no
    /// opacity part.
    pub fn split_alpha(&self) -> (String, Option<String>) {
        if self.is_opaque() {
            (self.rgb_hex(), None)
        } else {
            (self.rgb_hex(), Some(format!("{:.4}", self.opacity())))
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex_digits())
    }
}

fn parse_channel(s: &str, original: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor {
        value: original.to_string(),
    })
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = parse_channel(&c.to_string(), s)?;
                    channels[i] = v * 0x11;
                }
                Ok(Color::rgb(channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let r = parse_channel(&hex[0..2], s)?;
                let g = parse_channel(&hex[2..4], s)?;
                let b = parse_channel(&hex[4..6], s)?;
                let a = if hex.len() == 8 {
                    parse_channel(&hex[6..8], s)?
                } else {
                    0xff
                };
                Ok(Color::rgba(r, g, b, a))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
