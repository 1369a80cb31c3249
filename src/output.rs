//! CLI output formatting.
//!
//! Output is **information-centric**: each entry leads with its positional
//! index and title, with identifiers and source paths as indented context
//! lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Blog (3 entries)
//! 001 Year in Review
//!     Id: 2024/year-in-review
//!     Source: src/data/blog/2024/Year in Review.md
//! 002 Hello World
//!     Id: hello-world
//!     Source: src/data/blog/hello-world.md
//! 003 Shipping Notes (draft)
//!     Id: shipping-notes
//!     Source: src/data/blog/shipping.md
//!
//! Projects (1 entry)
//! ...
//!
//! Config
//!     config.toml
//!     dynamic_og_image: enabled
//! ```
//!
//! ## Routes
//!
//! ```text
//! /posts/hello-world/index.png → https://example.dev/posts/hello-world/index.png
//! /projects/folio/index.png → https://example.dev/projects/folio/index.png
//!
//! 2 routes
//! ```
//!
//! ## Build
//!
//! ```text
//! Blog (2 images)
//!     posts/hello-world/index.png: rendered
//!     posts/2024/year-in-review/index.png: cached
//!     posts/old-name/index.png: removed
//! ```
//!
//! Each view has a `format_*` function (returns `Vec<String>`, no I/O) and a
//! `print_*` wrapper that writes to stdout.

use crate::config::CONFIG_FILENAME;
use crate::content::{Collection, ContentEntry};
use crate::generate::{GenerateEvent, ImageStatus};
use crate::og;
use crate::scan::Site;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn count_of(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{} {}", count, noun)
}

fn collection_title(collection: Collection) -> &'static str {
    match collection {
        Collection::Blog => "Blog",
        Collection::Projects => "Projects",
    }
}

fn entry_lines(index: usize, entry: &ContentEntry) -> Vec<String> {
    let marker = if og::is_published(entry) {
        ""
    } else {
        " (draft)"
    };
    vec![
        format!("{} {}{}", format_index(index), entry.title(), marker),
        format!("    Id: {}", entry.id),
        format!("    Source: {}", entry.source_path.display()),
    ]
}

// ============================================================================
// Scan
// ============================================================================

/// Inventory of both collections plus the config in effect.
pub fn format_scan_output(site: &Site) -> Vec<String> {
    let mut lines = Vec::new();

    for collection in Collection::ALL {
        let entries = site.store.list_entries(collection);
        lines.push(format!(
            "{} ({})",
            collection_title(collection),
            count_of(entries.len(), "entry", "entries")
        ));
        for (i, entry) in entries.iter().enumerate() {
            lines.extend(entry_lines(i + 1, entry));
        }
        lines.push(String::new());
    }

    lines.push("Config".to_string());
    if site.root.join(CONFIG_FILENAME).exists() {
        lines.push(format!("    {}", CONFIG_FILENAME));
    }
    let state = if site.config.dynamic_og_image {
        "enabled"
    } else {
        "disabled"
    };
    lines.push(format!("    dynamic_og_image: {}", state));

    lines
}

pub fn print_scan_output(site: &Site) {
    for line in format_scan_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Every enumerated image route with its absolute URL.
pub fn format_routes_output(site: &Site) -> Vec<String> {
    let flags = site.config.feature_flags();
    if !flags.dynamic_og_image_enabled {
        return vec!["Dynamic OG images are disabled (dynamic_og_image = false)".to_string()];
    }

    let mut lines = Vec::new();
    let mut count = 0;
    for collection in Collection::ALL {
        for route in og::enumerate_routes(site.store.list_entries(collection), flags) {
            lines.push(format!(
                "{} \u{2192} {}",
                route.path(),
                route.url(&site.config.website)
            ));
            count += 1;
        }
    }
    if count > 0 {
        lines.push(String::new());
    }
    lines.push(count_of(count, "route", "routes"));
    lines
}

pub fn print_routes_output(site: &Site) {
    for line in format_routes_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Display lines for one build progress event.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::CollectionStarted {
            collection,
            route_count,
        } => vec![format!(
            "{} ({})",
            collection_title(*collection),
            count_of(*route_count, "image", "images")
        )],
        GenerateEvent::ImageWritten { output, status, .. } => {
            let status = match status {
                ImageStatus::Cached => "cached",
                ImageStatus::Copied => "copied",
                ImageStatus::Rendered => "rendered",
            };
            vec![format!("    {}: {}", output, status)]
        }
        GenerateEvent::ImageRemoved { output } => vec![format!("    {}: removed", output)],
    }
}
