//! Answering a request for one entry's image.

use crate::config::SiteFeatureFlags;
use crate::content::ContentEntry;
use crate::render::{OgRenderer, RenderError};

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Encoded image bytes and their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// HTTP-style response for an image route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub status: u16,
    pub status_text: &'static str,
    /// `None` for the empty not-found body.
    pub body: Option<ImageAsset>,
}

impl ImageResponse {
    /// 404 with an empty body. Used both when generation is disabled and for
    /// paths that never had a route.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            status_text: "Not found",
            body: None,
        }
    }

    /// 200 with the renderer's bytes, unmodified.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            status_text: "OK",
            body: Some(ImageAsset {
                content_type: PNG_CONTENT_TYPE,
                bytes,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|b| b.content_type)
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.body.as_ref().map(|b| b.bytes.as_slice())
    }
}

/// Produce the response for a route's bound entry.
///
/// The toggle is checked again here even though enumeration already filtered
/// on it: the route may have been discovered under an older configuration.
/// Renderer errors are returned as-is; there is no retry and no fallback
/// image.
pub fn respond(
    entry: &ContentEntry,
    flags: SiteFeatureFlags,
    renderer: &(impl OgRenderer + ?Sized),
) -> Result<ImageResponse, RenderError> {
    if !flags.dynamic_og_image_enabled {
        return Ok(ImageResponse::not_found());
    }
    let bytes = renderer.render(entry)?;
    Ok(ImageResponse::png(bytes))
}
