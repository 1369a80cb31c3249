//! Content store: loads and validates the site's collections.
//!
//! Walks each collection directory for Markdown entries, parses their front
//! matter, validates it against the collection schema and assigns every entry
//! its identifier:
//!
//! ```text
//! my-site/
//! ├── config.toml
//! └── src/data/
//!     ├── blog/
//!     │   ├── hello-world.md          → blog/hello-world
//!     │   ├── 2024/Year in Review.md  → blog/2024/year-in-review
//!     │   └── _notes.md               (skipped: underscore prefix)
//!     └── projects/
//!         ├── folio.md                → projects/folio
//!         └── folio-cover.png         (asset referenced by front matter)
//! ```
//!
//! ## Validation
//!
//! The store rejects, with the offending file in the error:
//! - malformed front matter
//! - front matter that does not satisfy the collection schema
//! - a front matter `slug` that is not already a slug (`../x`, `a\b`)
//! - two entries of one collection resolving to the same identifier
//!
//! Entries come back sorted by identifier. A missing collection directory is
//! an empty collection, not an error.

use crate::config::{self, SiteConfig};
use crate::content::{Collection, ContentEntry, ContentError, EntrySource};
use crate::frontmatter::{self, FrontmatterError};
use crate::naming;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{path}: {source}")]
    Frontmatter {
        path: PathBuf,
        source: FrontmatterError,
    },
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Cannot derive an identifier for {0}")]
    NoIdentifier(PathBuf),
    #[error("{path}: invalid slug {slug:?} (use lowercase words joined by '-', nested with '/')")]
    InvalidSlug { path: PathBuf, slug: String },
    #[error("Duplicate {collection} id {id:?}: {first} and {second}")]
    DuplicateId {
        collection: Collection,
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// All collections of a site, loaded and validated.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    blog: Vec<ContentEntry>,
    projects: Vec<ContentEntry>,
}

impl ContentStore {
    pub fn new(blog: Vec<ContentEntry>, projects: Vec<ContentEntry>) -> Self {
        Self { blog, projects }
    }

    /// Entries of one collection, sorted by identifier.
    pub fn list_entries(&self, collection: Collection) -> &[ContentEntry] {
        match collection {
            Collection::Blog => &self.blog,
            Collection::Projects => &self.projects,
        }
    }

    /// Look up an entry by identifier.
    pub fn get(&self, collection: Collection, id: &str) -> Option<&ContentEntry> {
        self.list_entries(collection).iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.blog.len() + self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded site: its configuration and content.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub store: ContentStore,
}

/// Load `config.toml` and every collection under `root`.
pub fn scan(root: &Path) -> Result<Site, ScanError> {
    let config = config::load_config(root)?;
    let store = load_store(root, &config)?;
    Ok(Site {
        root: root.to_path_buf(),
        config,
        store,
    })
}

/// Load every collection with an already-resolved config.
pub fn load_store(root: &Path, config: &SiteConfig) -> Result<ContentStore, ScanError> {
    Ok(ContentStore::new(
        load_collection(root, Collection::Blog, config)?,
        load_collection(root, Collection::Projects, config)?,
    ))
}

/// Load and validate one collection.
pub fn load_collection(
    root: &Path,
    collection: Collection,
    config: &SiteConfig,
) -> Result<Vec<ContentEntry>, ScanError> {
    let collection_dir = root.join(collection.dir(&config.content));
    if !collection_dir.is_dir() {
        debug!(
            "{} collection directory {} not found, treating as empty",
            collection,
            collection_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut by_id: BTreeMap<String, ContentEntry> = BTreeMap::new();

    for dir_entry in walkdir::WalkDir::new(&collection_dir).sort_by_file_name() {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !dir_entry.file_type().is_file() || !naming::is_entry_file(path) {
            continue;
        }

        let in_collection = path.strip_prefix(&collection_dir).unwrap_or(path);
        let relative_path = path.strip_prefix(root).unwrap_or(path);

        let text = fs::read_to_string(path)?;
        let document =
            frontmatter::parse_document(&text).map_err(|source| ScanError::Frontmatter {
                path: relative_path.to_path_buf(),
                source,
            })?;

        let id = match slug_override(&document.data, relative_path)? {
            Some(slug) => slug,
            None => naming::entry_id(in_collection)
                .ok_or_else(|| ScanError::NoIdentifier(relative_path.to_path_buf()))?,
        };

        let entry = ContentEntry::from_document(
            collection,
            id,
            document,
            &EntrySource {
                site_root: root,
                relative_path,
                site_author: &config.author,
            },
        )?;

        if let Some(existing) = by_id.get(&entry.id) {
            return Err(ScanError::DuplicateId {
                collection,
                id: entry.id.clone(),
                first: existing.source_path.clone(),
                second: entry.source_path.clone(),
            });
        }
        debug!("loaded {}/{} from {}", collection, entry.id, relative_path.display());
        by_id.insert(entry.id.clone(), entry);
    }

    Ok(by_id.into_values().collect())
}

/// A non-empty front matter `slug` replaces the path-derived identifier.
/// It is rejected unless it is already a slug.
fn slug_override(
    data: &serde_yaml::Mapping,
    relative_path: &Path,
) -> Result<Option<String>, ScanError> {
    let Some(raw) = data
        .get(Value::String("slug".to_string()))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };
    let slug = raw.trim().trim_matches('/');
    if slug.is_empty() {
        return Ok(None);
    }
    if !naming::is_valid_slug(slug) {
        return Err(ScanError::InvalidSlug {
            path: relative_path.to_path_buf(),
            slug: raw.to_string(),
        });
    }
    Ok(Some(slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn scan_fixture_site() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();

        assert_eq!(
            entry_ids(&site.store, Collection::Projects),
            vec!["folio", "lighthouse", "telemetry-dashboard"]
        );
        assert_eq!(
            entry_ids(&site.store, Collection::Blog),
            vec!["2024/year-in-review", "hello-world", "shipping-notes"]
        );
    }

    #[test]
    fn fixture_drafts_are_loaded_not_filtered() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let draft = find_entry(&site.store, Collection::Projects, "lighthouse");
        assert_eq!(draft.draft(), Some(true));
    }

    #[test]
    fn underscore_files_skipped() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        assert!(site.store.get(Collection::Blog, "_notes").is_none());
        assert!(site.store.get(Collection::Blog, "notes").is_none());
    }

    #[test]
    fn front_matter_slug_overrides_path() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        // fixtures/content/src/data/blog/shipping.md declares `slug: shipping-notes`
        let entry = find_entry(&site.store, Collection::Blog, "shipping-notes");
        assert!(entry.source_path.ends_with("shipping.md"));
    }

    #[test]
    fn slug_escaping_the_collection_rejected() {
        let tmp = TempDir::new().unwrap();
        write_entry(
            tmp.path(),
            "src/data/projects/sneaky.md",
            "---\nslug: ../../escaped\ntitle: Sneaky\ndescription: d\npubDatetime: 2024-01-01\n---\n",
        );

        let err = scan(tmp.path()).unwrap_err();
        assert!(
            matches!(&err, ScanError::InvalidSlug { path, slug }
                if path.ends_with("sneaky.md") && slug == "../../escaped"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn nested_slug_accepted() {
        let tmp = TempDir::new().unwrap();
        write_entry(
            tmp.path(),
            "src/data/blog/post.md",
            "---\nslug: /2024/launch/\ntitle: Launch\ndescription: d\npubDatetime: 2024-01-01\n---\n",
        );

        let site = scan(tmp.path()).unwrap();
        assert_eq!(entry_ids(&site.store, Collection::Blog), vec!["2024/launch"]);
    }

    #[test]
    fn missing_collection_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let site = scan(tmp.path()).unwrap();
        assert!(site.store.is_empty());
    }

    #[test]
    fn custom_collection_dir_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[content]\nprojects_dir = \"work\"\n",
        )
        .unwrap();
        write_entry(tmp.path(), "work/kiln.md", &project_md("Kiln", None));

        let site = scan(tmp.path()).unwrap();
        assert_eq!(entry_ids(&site.store, Collection::Projects), vec!["kiln"]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let tmp = TempDir::new().unwrap();
        write_entry(
            tmp.path(),
            "src/data/projects/Kiln.md",
            &project_md("Kiln", None),
        );
        write_entry(
            tmp.path(),
            "src/data/projects/other.md",
            "---\nslug: kiln\ntitle: Other\ndescription: d\npubDatetime: 2024-01-01\n---\n",
        );

        let err = scan(tmp.path()).unwrap_err();
        assert!(
            matches!(&err, ScanError::DuplicateId { id, .. } if id == "kiln"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn schema_error_names_the_file() {
        let tmp = TempDir::new().unwrap();
        write_entry(
            tmp.path(),
            "src/data/projects/broken.md",
            "---\ntitle: Broken\n---\n",
        );
        let err = scan(tmp.path()).unwrap_err().to_string();
        assert!(err.contains("broken.md"), "unexpected error: {err}");
    }

    #[test]
    fn unterminated_front_matter_names_the_file() {
        let tmp = TempDir::new().unwrap();
        write_entry(tmp.path(), "src/data/blog/open.md", "---\ntitle: Open\n");
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Frontmatter { ref path, .. } if path.ends_with("open.md")));
    }

    #[test]
    fn blog_author_defaults_to_site_author() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "author = \"Ada\"\n").unwrap();
        write_entry(
            tmp.path(),
            "src/data/blog/post.md",
            "---\ntitle: Post\ndescription: d\npubDatetime: 2024-01-01\n---\n",
        );
        let site = scan(tmp.path()).unwrap();
        let post = find_entry(&site.store, Collection::Blog, "post");
        assert_eq!(post.byline(), Some("Ada"));
    }

    #[test]
    fn non_markdown_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_entry(tmp.path(), "src/data/projects/notes.txt", "not content");
        write_entry(
            tmp.path(),
            "src/data/projects/kiln.md",
            &project_md("Kiln", Some(false)),
        );
        let site = scan(tmp.path()).unwrap();
        assert_eq!(entry_ids(&site.store, Collection::Projects), vec!["kiln"]);
    }
}
