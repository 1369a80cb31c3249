//! Card cache for incremental builds.
//!
//! Rendering every card on every build is wasted work when most entries have
//! not changed. The build consults this cache before asking the renderer for
//! a route's PNG, and reuses the previous output when nothing that feeds the
//! card has changed.
//!
//! ## Cache keys
//!
//! Lookups are **content-addressed** by `entry_hash` + `style_hash`, not by
//! output path. Renaming an entry file or changing its slug therefore copies
//! the old card instead of re-rendering it.
//!
//! - **`entry_hash`**: SHA-256 of the entry's serialized front matter and
//!   body, plus the bytes of its local cover asset when it has one.
//! - **`style_hash`**: SHA-256 of the card style (canvas size and palette).
//!   Editing `[og]` in `config.toml` re-renders everything.
//!
//! A hit requires a matching entry **and** the previously written file still
//! on disk.
//!
//! ## Storage
//!
//! The manifest lives at `<output_dir>/.og-cache.json`, next to the cards, so
//! it travels with the output directory when CI caches it.
//!
//! `build --no-cache` starts from an empty manifest.

use crate::content::{ContentEntry, EntryData, ImageRef};
use crate::render::CardStyle;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const MANIFEST_FILENAME: &str = ".og-cache.json";

/// Bump to invalidate every existing cache when the key computation or the
/// card drawing changes.
const MANIFEST_VERSION: u32 = 2;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub entry_hash: String,
    pub style_hash: String,
}

/// On-disk manifest: output path (relative to the output dir) → hashes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{entry_hash}:{style_hash}"` → every output path drawn from it.
    /// Rebuilt on load.
    #[serde(skip)]
    content_index: HashMap<String, BTreeSet<String>>,
}

fn content_key(entry_hash: &str, style_hash: &str) -> String {
    format!("{}:{}", entry_hash, style_hash)
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the output directory. A missing, corrupt, or outdated
    /// manifest yields an empty one.
    pub fn load(output_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(manifest_path(output_dir)) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("ignoring unreadable card cache: {e}");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            tracing::debug!(
                found = manifest.version,
                expected = MANIFEST_VERSION,
                "card cache version changed, starting fresh"
            );
            return Self::empty();
        }
        manifest.rebuild_index();
        manifest
    }

    fn rebuild_index(&mut self) {
        self.content_index.clear();
        for (path, e) in &self.entries {
            self.content_index
                .entry(content_key(&e.entry_hash, &e.style_hash))
                .or_default()
                .insert(path.clone());
        }
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Output path of a previous render with the same hashes, if that file
    /// still exists.
    ///
    /// `output_path` itself wins when it matches. Otherwise any other path
    /// drawn from the same content is returned, which the caller copies.
    pub fn find_cached(
        &self,
        output_path: &str,
        entry_hash: &str,
        style_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let on_disk = |path: &str| output_dir.join(path).is_file();

        if let Some(e) = self.entries.get(output_path)
            && e.entry_hash == entry_hash
            && e.style_hash == style_hash
            && on_disk(output_path)
        {
            return Some(output_path.to_string());
        }

        self.content_index
            .get(&content_key(entry_hash, style_hash))?
            .iter()
            .find(|path| on_disk(path.as_str()))
            .cloned()
    }

    /// Record the hashes a card was written with, replacing whatever was
    /// recorded for that path before.
    pub fn insert(&mut self, output_path: String, entry_hash: String, style_hash: String) {
        if let Some(previous) = self.entries.get(&output_path) {
            let old_key = content_key(&previous.entry_hash, &previous.style_hash);
            if let Some(paths) = self.content_index.get_mut(&old_key) {
                paths.remove(&output_path);
                if paths.is_empty() {
                    self.content_index.remove(&old_key);
                }
            }
        }

        self.content_index
            .entry(content_key(&entry_hash, &style_hash))
            .or_default()
            .insert(output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                entry_hash,
                style_hash,
            },
        );
    }

    /// Keep only the given output paths, returning the ones dropped.
    pub fn retain_paths(&mut self, keep: &HashSet<String>) -> Vec<String> {
        let mut dropped: Vec<String> = self
            .entries
            .keys()
            .filter(|path| !keep.contains(*path))
            .cloned()
            .collect();
        dropped.sort();
        for path in &dropped {
            self.entries.remove(path);
        }
        self.rebuild_index();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hash everything a card is drawn from.
///
/// The identifier and source path are left out so a renamed entry still
/// matches. Local image assets count by their bytes and file name, not by
/// where the site is checked out, so the same site built from another
/// directory hits the cache. An edited cover re-renders the card even when
/// the front matter is untouched.
pub fn hash_entry(entry: &ContentEntry) -> io::Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(b"entry\0");
    hasher.update(serde_json::to_vec(&without_asset_dirs(&entry.data))?);
    hasher.update(b"\0body\0");
    hasher.update(entry.body.as_bytes());
    if let Some(cover) = entry.cover().and_then(|c| c.as_asset()) {
        hasher.update(b"\0cover\0");
        hasher.update(std::fs::read(cover)?);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn without_asset_dirs(data: &EntryData) -> EntryData {
    fn strip(image: &mut Option<ImageRef>) {
        if let Some(ImageRef::Asset(path)) = image {
            *path = path.file_name().map(PathBuf::from).unwrap_or_default();
        }
    }

    let mut data = data.clone();
    match &mut data {
        EntryData::Blog(post) => strip(&mut post.og_image),
        EntryData::Projects(project) => {
            strip(&mut project.image);
            strip(&mut project.logo);
        }
    }
    data
}

pub fn hash_style(style: &CardStyle) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"style\0");
    hasher.update(style.width.to_le_bytes());
    hasher.update(style.height.to_le_bytes());
    for color in [
        style.background,
        style.foreground,
        style.muted,
        style.accent,
        style.border,
    ] {
        hasher.update(color.0);
    }
    format!("{:x}", hasher.finalize())
}

/// Cache outcome counts for one build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits, self.copies) {
            (0, 0) => write!(f, "{} rendered", self.misses),
            (hits, 0) => write!(
                f,
                "{} cached, {} rendered ({} total)",
                hits,
                self.misses,
                self.total()
            ),
            (hits, copies) => write!(
                f,
                "{} cached, {} copied, {} rendered ({} total)",
                hits,
                copies,
                self.misses,
                self.total()
            ),
        }
    }
}

pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}
