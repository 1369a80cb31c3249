//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, in-memory entry builders, and store lookups.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = scan(tmp.path()).unwrap();
//!
//! assert_eq!(
//!     entry_ids(&site.store, Collection::Projects),
//!     vec!["folio", "lighthouse", "telemetry-dashboard"]
//! );
//! let draft = find_entry(&site.store, Collection::Projects, "lighthouse");
//! assert_eq!(draft.draft(), Some(true));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::content::{BlogPost, Collection, ContentEntry, EntryData, Project, parse_datetime};
use crate::scan::ContentStore;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a content file under `root`, creating parent directories.
pub fn write_entry(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Minimal valid project front matter.
pub fn project_md(title: &str, draft: Option<bool>) -> String {
    let draft_line = match draft {
        Some(d) => format!("draft: {}\n", d),
        None => String::new(),
    };
    format!(
        "---\ntitle: {}\ndescription: About {}\npubDatetime: 2024-03-01\n{}---\n\nBody.\n",
        title, title, draft_line
    )
}

/// Write a solid-color PNG.
pub fn write_test_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// In-memory entries
// =========================================================================

/// A project entry with the given identifier and `draft` flag.
pub fn project_entry(id: &str, draft: Option<bool>) -> ContentEntry {
    ContentEntry {
        id: id.to_string(),
        source_path: PathBuf::from(format!("src/data/projects/{}.md", id)),
        body: String::new(),
        data: EntryData::Projects(Project {
            title: format!("Project {}", id),
            description: format!("Everything about {}", id),
            description_de: None,
            pub_datetime: parse_datetime("2024-03-01").unwrap(),
            tech_stack: vec!["rust".to_string(), "cli".to_string()],
            live_url: None,
            github_url: None,
            image: None,
            logo: None,
            featured: None,
            draft,
            keywords: Vec::new(),
        }),
    }
}

/// A blog entry with the given identifier and `draft` flag.
pub fn blog_entry(id: &str, draft: Option<bool>) -> ContentEntry {
    ContentEntry {
        id: id.to_string(),
        source_path: PathBuf::from(format!("src/data/blog/{}.md", id)),
        body: "Post body.\n".to_string(),
        data: EntryData::Blog(BlogPost {
            author: "Site Author".to_string(),
            pub_datetime: parse_datetime("2024-03-01T09:00:00Z").unwrap(),
            mod_datetime: None,
            title: format!("Post {}", id),
            featured: None,
            draft,
            tags: vec!["others".to_string()],
            og_image: None,
            description: format!("Notes on {}", id),
            canonical_url: None,
            hide_edit_post: None,
            timezone: None,
        }),
    }
}

// =========================================================================
// Store lookups
// =========================================================================

/// Identifiers of a collection, in store order.
pub fn entry_ids(store: &ContentStore, collection: Collection) -> Vec<&str> {
    store
        .list_entries(collection)
        .iter()
        .map(|e| e.id.as_str())
        .collect()
}

/// Find an entry by identifier. Panics if not found.
pub fn find_entry<'a>(store: &'a ContentStore, collection: Collection, id: &str) -> &'a ContentEntry {
    store.get(collection, id).unwrap_or_else(|| {
        panic!(
            "{} entry '{}' not found. Available: {:?}",
            collection,
            id,
            entry_ids(store, collection)
        )
    })
}
