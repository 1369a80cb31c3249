//! Social-preview ("OG") image pipeline.
//!
//! Decides which entries get a generated card, where each card is served,
//! and how a single request for a card is answered:
//!
//! ```text
//! build time     entries ──► eligibility ──► routes (/projects/<id>/index.png, entry)
//! request time   route.entry + flags ──► respond ──► 200 image/png | 404 Not found
//! ```
//!
//! - [`eligibility`]: drops drafts; everything is dropped when
//!   `dynamic_og_image` is off.
//! - [`routes`]: binds each eligible entry to its route path.
//! - [`response`]: re-checks the toggle, calls the renderer, packages bytes.
//!
//! Enumeration and response handling take [`SiteFeatureFlags`] explicitly.
//! A route enumerated under one configuration may be requested under another
//! (the preview server re-reads `config.toml` per request), so the handler
//! never assumes an existing route implies the toggle is still on.
//!
//! [`SiteFeatureFlags`]: crate::config::SiteFeatureFlags

pub mod eligibility;
pub mod response;
pub mod routes;

pub use eligibility::{eligible_entries, is_published};
pub use response::{ImageAsset, ImageResponse, PNG_CONTENT_TYPE, respond};
pub use routes::{IMAGE_FILENAME, Route, enumerate_routes};
