//! # Folio
//!
//! Content collections and social-preview images for a personal site.
//!
//! Writing lives in two Markdown collections, `blog` and `projects`, each
//! entry a file with YAML front matter. Folio loads and validates them, then
//! produces one Open Graph PNG per published entry, either as a static build
//! or from a local preview server.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      config.toml + src/data/**/*.md  →  Site (config + ContentStore)
//! 2. Routes    ContentStore × feature flag     →  /<root>/<id>/index.png
//! 3. Respond   route's entry                   →  200 image/png | 404
//! ```
//!
//! The image core in [`og`] is three small, pure pieces: an eligibility
//! filter, a route enumerator and a response handler. Hosts ([`generate`],
//! [`serve`]) wire them to a renderer and to the filesystem or a socket.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, validation, feature flags |
//! | [`frontmatter`] | Splits a Markdown file into YAML front matter and body |
//! | [`naming`] | Path → entry identifier slugs |
//! | [`content`] | Collection schemas and the typed [`content::ContentEntry`] |
//! | [`scan`] | Walks collection directories into a [`scan::ContentStore`] |
//! | [`og`] | Eligibility filter, route enumerator, image response handler |
//! | [`render`] | [`render::OgRenderer`] seam and the `image`-crate card renderer |
//! | [`cache`] | Content-addressed cache for incremental builds |
//! | [`generate`] | Static build of every image, in parallel |
//! | [`serve`] | `tiny_http` preview server |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Flag, Checked Twice
//!
//! `dynamic_og_image` gates both enumeration and response. A route that was
//! discovered before the flag was turned off still answers `404`; the preview
//! server re-reads the config per request to exercise exactly that.
//!
//! ## Drafts Are Loaded, Not Hidden
//!
//! The content store keeps drafts so `scan` can list them. Only the image
//! pipeline filters them out, and only on an explicit `draft: true`.
//!
//! ## Pure-Rust Rendering
//!
//! Cards are composed with the `image` crate, cover art included. No browser,
//! no system fonts, no native libraries: the same entry renders to the same
//! bytes on every machine, which is what makes the build cache sound.

pub mod cache;
pub mod config;
pub mod content;
pub mod frontmatter;
pub mod generate;
pub mod naming;
pub mod og;
pub mod output;
pub mod render;
pub mod scan;
pub mod serve;

#[cfg(test)]
pub(crate) mod test_helpers;
