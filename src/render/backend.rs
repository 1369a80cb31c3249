//! Renderer trait and shared error type.
//!
//! The [`OgRenderer`] trait is the seam between the image pipeline and the
//! pixel work. The pipeline only ever asks for "the PNG bytes of this entry";
//! how they are composed is the renderer's business.
//!
//! The production implementation is
//! [`CardRenderer`](super::card::CardRenderer).

use crate::content::ContentEntry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {0}")]
    Decode(String),
    #[error("PNG encode failed: {0}")]
    Encode(String),
    #[error("Invalid color {0:?}")]
    InvalidColor(String),
}

/// Composes a content entry into an encoded PNG.
///
/// Implementations must be `Sync`: the build renders routes in parallel from
/// a shared renderer.
pub trait OgRenderer: Sync {
    fn render(&self, entry: &ContentEntry) -> Result<Vec<u8>, RenderError>;
}
