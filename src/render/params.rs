//! Parameter types for card rendering.
//!
//! These describe *what* the card looks like, not how pixels are pushed.
//!
//! - [`Rgb`]: an opaque color parsed from `#rgb` / `#rrggbb`.
//! - [`CardStyle`]: canvas size and palette, built from the `[og]` config.

use super::backend::RenderError;
use crate::config::OgConfig;
use serde::Serialize;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(value: &str) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidColor(value.to_string());
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    rgb[i] = v * 17;
                }
                Ok(Self(rgb))
            }
            6 => Ok(Self([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            _ => Err(invalid()),
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

/// Canvas size and palette of a social card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStyle {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub foreground: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub border: Rgb,
}

impl CardStyle {
    pub fn from_config(og: &OgConfig) -> Result<Self, RenderError> {
        Ok(Self {
            width: og.width,
            height: og.height,
            background: Rgb::from_hex(&og.background)?,
            foreground: Rgb::from_hex(&og.foreground)?,
            muted: Rgb::from_hex(&og.muted)?,
            accent: Rgb::from_hex(&og.accent)?,
            border: Rgb::from_hex(&og.border)?,
        })
    }
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            background: Rgb([0xfd, 0xfd, 0xfd]),
            foreground: Rgb([0x28, 0x27, 0x28]),
            muted: Rgb([0x8e, 0x8e, 0x8e]),
            accent: Rgb([0x00, 0x6c, 0xac]),
            border: Rgb([0xec, 0xe9, 0xe9]),
        }
    }
}
