//! Site configuration module.
//!
//! Handles loading, validating, and merging the site's `config.toml`. Stock
//! defaults are overridden key by key by the user's file, which lives in the
//! site root next to the `src/data/` content tree:
//!
//! ```text
//! my-site/
//! ├── config.toml              # Site config (optional)
//! └── src/data/
//!     ├── blog/                # Blog collection
//!     └── projects/            # Projects collection
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! website = "https://example.pages.dev/"
//! author = "Site Author"
//! title = "Folio"
//! dynamic_og_image = true   # Generate social-preview images per entry
//!
//! [content]
//! blog_dir = "src/data/blog"
//! projects_dir = "src/data/projects"
//!
//! [og]
//! width = 1200
//! height = 630
//! background = "#fdfdfd"
//! accent = "#006cac"
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the site configuration file in the site root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public base URL of the deployed site.
    pub website: String,
    /// Default author for blog posts without an `author` field.
    pub author: String,
    /// Author profile link (about page, GitHub, LinkedIn...).
    pub profile: String,
    /// Site description used in meta tags.
    pub desc: String,
    /// Site title.
    pub title: String,
    /// Static fallback social image (relative to `public/`).
    pub og_image: String,
    pub light_and_dark_mode: bool,
    pub post_per_index: u32,
    pub post_per_page: u32,
    /// Grace period for scheduled posts, in milliseconds.
    pub scheduled_post_margin_ms: u64,
    pub show_archives: bool,
    pub show_back_button: bool,
    /// "Edit page" link settings.
    pub edit_post: EditPostConfig,
    /// Master toggle for per-entry social-preview image generation.
    pub dynamic_og_image: bool,
    /// Text direction: `ltr`, `rtl` or `auto`.
    pub dir: String,
    pub lang: String,
    pub timezone: String,
    /// Collection directories, relative to the site root.
    pub content: ContentConfig,
    /// Social-preview card dimensions and colors.
    pub og: OgConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            website: "https://example.pages.dev/".to_string(),
            author: "Site Author".to_string(),
            profile: "https://example.pages.dev/about/".to_string(),
            desc: "A personal site with writing and projects.".to_string(),
            title: "Folio".to_string(),
            og_image: "og.jpg".to_string(),
            light_and_dark_mode: true,
            post_per_index: 6,
            post_per_page: 6,
            scheduled_post_margin_ms: 15 * 60 * 1000,
            show_archives: true,
            show_back_button: true,
            edit_post: EditPostConfig::default(),
            dynamic_og_image: true,
            dir: "ltr".to_string(),
            lang: "en".to_string(),
            timezone: "Europe/Berlin".to_string(),
            content: ContentConfig::default(),
            og: OgConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

const TEXT_DIRECTIONS: &[&str] = &["ltr", "rtl", "auto"];

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.website.starts_with("http://") || self.website.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "website must start with http:// or https://".into(),
            ));
        }
        if self.post_per_index == 0 || self.post_per_page == 0 {
            return Err(ConfigError::Validation(
                "post_per_index and post_per_page must be non-zero".into(),
            ));
        }
        if !TEXT_DIRECTIONS.contains(&self.dir.as_str()) {
            return Err(ConfigError::Validation(format!(
                "dir must be one of {:?}, got {:?}",
                TEXT_DIRECTIONS, self.dir
            )));
        }
        self.og.validate()
    }

    /// The feature toggles the image pipeline reads.
    pub fn feature_flags(&self) -> SiteFeatureFlags {
        SiteFeatureFlags {
            dynamic_og_image_enabled: self.dynamic_og_image,
        }
    }
}

/// Read-only feature toggles consulted by the OG image pipeline.
///
/// Passed explicitly to both route enumeration and the response handler so
/// the two can observe different configuration states (e.g. a server that
/// re-reads `config.toml` per request after routes were enumerated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiteFeatureFlags {
    pub dynamic_og_image_enabled: bool,
}

impl SiteFeatureFlags {
    pub fn enabled() -> Self {
        Self {
            dynamic_og_image_enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            dynamic_og_image_enabled: false,
        }
    }
}

/// "Edit page" link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditPostConfig {
    pub enabled: bool,
    pub text: String,
    pub url: String,
}

impl Default for EditPostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            text: "Edit page".to_string(),
            url: String::new(),
        }
    }
}

/// Locations of the content collections, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    pub blog_dir: String,
    pub projects_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            blog_dir: "src/data/blog".to_string(),
            projects_dir: "src/data/projects".to_string(),
        }
    }
}

/// Social-preview card settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OgConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Page background behind the card.
    pub background: String,
    /// Title text color.
    pub foreground: String,
    /// Description and chip color.
    pub muted: String,
    /// Accent stripe color.
    pub accent: String,
    /// Card border and shadow color.
    pub border: String,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            background: "#fdfdfd".to_string(),
            foreground: "#282728".to_string(),
            muted: "#8e8e8e".to_string(),
            accent: "#006cac".to_string(),
            border: "#ece9e9".to_string(),
        }
    }
}

const OG_MIN_EDGE: u32 = 200;
const OG_MAX_EDGE: u32 = 4096;

impl OgConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, edge) in [("og.width", self.width), ("og.height", self.height)] {
            if !(OG_MIN_EDGE..=OG_MAX_EDGE).contains(&edge) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be {OG_MIN_EDGE}-{OG_MAX_EDGE}, got {edge}"
                )));
            }
        }
        for (name, color) in [
            ("og.background", &self.background),
            ("og.foreground", &self.foreground),
            ("og.muted", &self.muted),
            ("og.accent", &self.accent),
            ("og.border", &self.border),
        ] {
            if !is_hex_color(color) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a #rgb or #rrggbb color, got {color:?}"
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given site root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Public base URL of the deployed site.
website = "https://example.pages.dev/"

# Default author for blog posts that don't set one.
author = "Site Author"
profile = "https://example.pages.dev/about/"
desc = "A personal site with writing and projects."
title = "Folio"

# Static fallback social image, relative to public/.
og_image = "og.jpg"

light_and_dark_mode = true
post_per_index = 6
post_per_page = 6

# Grace period for scheduled posts, in milliseconds (15 minutes).
scheduled_post_margin_ms = 900000

show_archives = true
show_back_button = true

# Generate a social-preview PNG for every published blog post and project.
# Turning this off removes the routes at build time and makes the preview
# server answer 404 for them.
dynamic_og_image = true

# Text direction: "ltr", "rtl" or "auto".
dir = "ltr"
lang = "en"
timezone = "Europe/Berlin"

# ---------------------------------------------------------------------------
# "Edit page" links
# ---------------------------------------------------------------------------
[edit_post]
enabled = false
text = "Edit page"
url = ""

# ---------------------------------------------------------------------------
# Content collections (relative to the site root)
# ---------------------------------------------------------------------------
[content]
blog_dir = "src/data/blog"
projects_dir = "src/data/projects"

# ---------------------------------------------------------------------------
# Social-preview card
# ---------------------------------------------------------------------------
[og]
# Canvas size in pixels (200-4096 on each edge).
width = 1200
height = 630

# Colors as #rgb or #rrggbb.
background = "#fdfdfd"
foreground = "#282728"
muted = "#8e8e8e"
accent = "#006cac"
border = "#ece9e9"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
