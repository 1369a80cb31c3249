//! Social card rendering in pure Rust, with no system dependencies.
//!
//! The module is split into:
//! - **Backend**: [`OgRenderer`] trait + [`RenderError`]
//! - **Parameters**: [`CardStyle`] and colors, built from the `[og]` config
//! - **Layout**: pure geometry for every card element (unit testable)
//! - **Card**: [`CardRenderer`], the `image`-crate implementation

pub mod backend;
mod card;
mod layout;
mod params;

pub use backend::{OgRenderer, RenderError};
pub use card::CardRenderer;
pub use params::{CardStyle, Rgb};
