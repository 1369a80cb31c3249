//! Pure Rust card renderer.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Canvas, fills | `image::RgbaImage` |
//! | Cover decode (JPEG, PNG, WebP) | `image::ImageReader` with format sniffing |
//! | Cover crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Composite | `image::imageops::overlay` |
//! | Encode | `image::codecs::png::PngEncoder` into a `Vec<u8>` |
//!
//! Output depends only on the entry and the [`CardStyle`], so the same
//! entry always renders to the same bytes.

use super::backend::{OgRenderer, RenderError};
use super::layout::{CardText, Rect, compute_layout};
use super::params::CardStyle;
use crate::config::OgConfig;
use crate::content::ContentEntry;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, Rgba, RgbaImage};
use std::path::Path;

/// Renders entries as framed cards with optional cover art.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    style: CardStyle,
}

impl CardRenderer {
    pub fn new(style: CardStyle) -> Self {
        Self { style }
    }

    pub fn from_config(og: &OgConfig) -> Result<Self, RenderError> {
        Ok(Self::new(CardStyle::from_config(og)?))
    }

    pub fn style(&self) -> &CardStyle {
        &self.style
    }

    fn compose(&self, entry: &ContentEntry) -> Result<RgbaImage, RenderError> {
        let style = &self.style;
        let cover_path = entry.cover().and_then(|c| c.as_asset());

        let layout = compute_layout(
            style.width,
            style.height,
            &CardText {
                title: entry.title(),
                description: entry.description(),
                labels: entry.labels(),
                byline: entry.byline(),
                has_cover: cover_path.is_some(),
            },
        );

        let mut canvas = RgbaImage::from_pixel(style.width, style.height, style.background.to_rgba());

        fill(&mut canvas, layout.shadow, style.border.to_rgba());
        fill(&mut canvas, layout.card, style.border.to_rgba());
        fill(
            &mut canvas,
            layout.card.inset(layout.border),
            style.background.to_rgba(),
        );
        fill(&mut canvas, layout.accent, style.accent.to_rgba());

        if let (Some(panel), Some(path)) = (layout.cover, cover_path) {
            let cover = load_cover(path)?
                .resize_to_fill(panel.width, panel.height, FilterType::Lanczos3)
                .to_rgba8();
            image::imageops::overlay(&mut canvas, &cover, i64::from(panel.x), i64::from(panel.y));
        }

        for line in &layout.title {
            fill(&mut canvas, *line, style.foreground.to_rgba());
        }
        for line in &layout.description {
            fill(&mut canvas, *line, style.muted.to_rgba());
        }
        for chip in &layout.chips {
            fill(&mut canvas, *chip, style.muted.to_rgba());
            fill(&mut canvas, chip.inset(2), style.background.to_rgba());
            fill(&mut canvas, chip.inset(chip.height / 3), style.muted.to_rgba());
        }
        if let Some(byline) = layout.byline {
            fill(&mut canvas, byline, style.foreground.to_rgba());
        }

        Ok(canvas)
    }
}

impl OgRenderer for CardRenderer {
    fn render(&self, entry: &ContentEntry) -> Result<Vec<u8>, RenderError> {
        let canvas = self.compose(entry)?;
        encode_png(&canvas)
    }
}

/// Fill a rectangle, clipped to the canvas.
fn fill(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x_end = rect.right().min(canvas.width());
    let y_end = rect.bottom().min(canvas.height());
    for y in rect.y.min(y_end)..y_end {
        for x in rect.x.min(x_end)..x_end {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn load_cover(path: &Path) -> Result<DynamicImage, RenderError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| RenderError::Decode(format!("{}: {}", path.display(), e)))
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}
