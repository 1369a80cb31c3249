//! Route enumeration for generated images.
//!
//! Each eligible entry gets exactly one route whose single dynamic segment is
//! the entry identifier, used verbatim:
//!
//! ```text
//! projects/folio            → /projects/folio/index.png
//! blog/2024/year-in-review  → /posts/2024/year-in-review/index.png
//! ```
//!
//! Identifiers are already path-safe (see [`naming`](crate::naming)), so no
//! encoding happens here.

use super::eligibility::eligible_entries;
use crate::config::SiteFeatureFlags;
use crate::content::{Collection, ContentEntry};
use std::path::{Path, PathBuf};

/// File name every generated image is served as, inside its entry directory.
pub const IMAGE_FILENAME: &str = "index.png";

/// A discoverable image route with its bound entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route<'a> {
    /// The dynamic path parameter: the entry identifier.
    pub param: &'a str,
    /// The entry the route dispatches to.
    pub entry: &'a ContentEntry,
}

impl<'a> Route<'a> {
    pub fn new(entry: &'a ContentEntry) -> Self {
        Self {
            param: &entry.id,
            entry,
        }
    }

    pub fn collection(&self) -> Collection {
        self.entry.collection()
    }

    /// Public URL path: `/<collection-root>/<id>/index.png`.
    pub fn path(&self) -> String {
        route_path(self.collection(), self.param)
    }

    /// Path relative to the build output root.
    pub fn relative_output(&self) -> String {
        format!(
            "{}/{}/{}",
            self.collection().route_root(),
            self.param,
            IMAGE_FILENAME
        )
    }

    /// Where a static build writes this route's image.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.relative_output())
    }

    /// Absolute URL under the site's public base URL.
    pub fn url(&self, website: &str) -> String {
        format!("{}{}", website.trim_end_matches('/'), self.path())
    }
}

/// Public URL path for an image route.
pub fn route_path(collection: Collection, id: &str) -> String {
    format!("/{}/{}/{}", collection.route_root(), id, IMAGE_FILENAME)
}

/// One route per eligible entry.
pub fn enumerate_routes(entries: &[ContentEntry], flags: SiteFeatureFlags) -> Vec<Route<'_>> {
    eligible_entries(entries, flags)
        .into_iter()
        .map(Route::new)
        .collect()
}
