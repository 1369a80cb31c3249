//! Which entries get a social-preview image.

use crate::config::SiteFeatureFlags;
use crate::content::ContentEntry;

/// An entry is published unless its `draft` flag is strictly `true`.
/// A missing flag and `draft: false` are equivalent.
pub fn is_published(entry: &ContentEntry) -> bool {
    entry.draft() != Some(true)
}

/// The subset of `entries` eligible for image generation, in input order.
///
/// With `dynamic_og_image` disabled nothing is eligible and no entry is
/// inspected.
pub fn eligible_entries(entries: &[ContentEntry], flags: SiteFeatureFlags) -> Vec<&ContentEntry> {
    if !flags.dynamic_og_image_enabled {
        return Vec::new();
    }
    entries.iter().filter(|e| is_published(e)).collect()
}
