//! Static build of every social-preview image.
//!
//! For each collection the build lists entries, enumerates their image
//! routes, and asks the response handler for each route in parallel. Every
//! `200` body is written to the route's output path:
//!
//! ```text
//! dist/
//! ├── .og-cache.json
//! ├── posts/
//! │   ├── hello-world/index.png
//! │   └── 2024/year-in-review/index.png
//! └── projects/
//!     └── folio/index.png
//! ```
//!
//! A `404` (generation disabled) writes nothing. A renderer failure aborts
//! the build with the failing route in the error.
//!
//! The output directory is reused between builds. Once every route is
//! written, any `index.png` under a collection root that this build did not
//! write is deleted: its entry became a draft, was removed or renamed, or
//! generation was turned off.
//!
//! Before rendering, the [`cache`](crate::cache) is consulted: an entry whose
//! content and card style are unchanged keeps its previous image (or has it
//! copied, when its route moved).

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::SiteFeatureFlags;
use crate::content::Collection;
use crate::og::{self, IMAGE_FILENAME, Route};
use crate::render::{CardRenderer, OgRenderer, RenderError};
use crate::scan::{ContentStore, Site};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid card style: {0}")]
    Style(#[source] RenderError),
    #[error("Failed to render {route}: {source}")]
    Render {
        route: String,
        #[source]
        source: RenderError,
    },
}

/// How a route's image ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// Previous output is still current.
    Cached,
    /// Previous output copied from the route's old location.
    Copied,
    /// Freshly rendered.
    Rendered,
}

/// Progress reported while building, one event per collection and route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateEvent {
    CollectionStarted {
        collection: Collection,
        route_count: usize,
    },
    ImageWritten {
        /// Public route path, e.g. `/projects/folio/index.png`.
        route: String,
        /// Output path relative to the output directory.
        output: String,
        status: ImageStatus,
    },
    /// An image left over from an earlier build was deleted.
    ImageRemoved { output: String },
}

#[derive(Debug)]
pub struct GenerateResult {
    /// Relative output paths, in collection then identifier order.
    pub written: Vec<String>,
    /// Stale images deleted from the output directory.
    pub removed: Vec<String>,
    pub cache_stats: CacheStats,
}

/// Build every image of the site with the card renderer configured in
/// `[og]`.
pub fn generate(
    site: &Site,
    output_dir: &Path,
    use_cache: bool,
    progress: Option<Sender<GenerateEvent>>,
) -> Result<GenerateResult, GenerateError> {
    let renderer = CardRenderer::from_config(&site.config.og).map_err(GenerateError::Style)?;
    let style_hash = cache::hash_style(renderer.style());
    generate_with_renderer(
        &site.store,
        site.config.feature_flags(),
        &renderer,
        &style_hash,
        output_dir,
        use_cache,
        progress,
    )
}

struct Written {
    route: String,
    output: String,
    entry_hash: String,
    status: ImageStatus,
}

/// Build with an explicit renderer (allows testing with a mock).
///
/// `style_hash` identifies the renderer's output for cache purposes; two
/// renderers that draw differently must not share one.
pub fn generate_with_renderer(
    store: &ContentStore,
    flags: SiteFeatureFlags,
    renderer: &impl OgRenderer,
    style_hash: &str,
    output_dir: &Path,
    use_cache: bool,
    progress: Option<Sender<GenerateEvent>>,
) -> Result<GenerateResult, GenerateError> {
    fs::create_dir_all(output_dir)?;

    let mut manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    let mut stats = CacheStats::default();
    let mut written = Vec::new();

    for collection in Collection::ALL {
        let routes = og::enumerate_routes(store.list_entries(collection), flags);
        tracing::debug!(%collection, routes = routes.len(), "building collection");
        if let Some(tx) = &progress {
            tx.send(GenerateEvent::CollectionStarted {
                collection,
                route_count: routes.len(),
            })
            .ok();
        }

        let results = routes
            .par_iter()
            .map(|route| {
                build_route(route, flags, renderer, &manifest, style_hash, output_dir)
                    .inspect(|outcome| {
                        if let (Some(w), Some(tx)) = (outcome, &progress) {
                            tx.send(GenerateEvent::ImageWritten {
                                route: w.route.clone(),
                                output: w.output.clone(),
                                status: w.status,
                            })
                            .ok();
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for w in results.into_iter().flatten() {
            match w.status {
                ImageStatus::Cached => stats.hit(),
                ImageStatus::Copied => stats.copy(),
                ImageStatus::Rendered => stats.miss(),
            }
            manifest.insert(w.output.clone(), w.entry_hash, style_hash.to_string());
            written.push(w.output);
        }
    }

    let keep: HashSet<String> = written.iter().cloned().collect();
    manifest.retain_paths(&keep);
    let removed = remove_stale_images(output_dir, &keep)?;
    if let Some(tx) = &progress {
        for output in &removed {
            tx.send(GenerateEvent::ImageRemoved {
                output: output.clone(),
            })
            .ok();
        }
    }

    manifest.save(output_dir)?;
    Ok(GenerateResult {
        written,
        removed,
        cache_stats: stats,
    })
}

/// Delete every image under the collection roots that is not in `keep`, then
/// the directories that leaves empty. Other files are left alone.
fn remove_stale_images(
    output_dir: &Path,
    keep: &HashSet<String>,
) -> Result<Vec<String>, GenerateError> {
    let mut removed = Vec::new();

    for collection in Collection::ALL {
        let root = output_dir.join(collection.route_root());
        if !root.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != IMAGE_FILENAME {
                continue;
            }
            let relative = relative_output(entry.path(), output_dir);
            if keep.contains(&relative) {
                continue;
            }
            fs::remove_file(entry.path())?;
            tracing::debug!(output = %relative, "removed stale image");
            removed.push(relative);
        }

        for entry in WalkDir::new(&root).contents_first(true) {
            let entry = entry?;
            if entry.file_type().is_dir() && fs::read_dir(entry.path())?.next().is_none() {
                fs::remove_dir(entry.path())?;
            }
        }
    }

    Ok(removed)
}

/// `/`-joined path relative to the output directory, matching
/// [`Route::relative_output`].
fn relative_output(path: &Path, output_dir: &Path) -> String {
    path.strip_prefix(output_dir)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn build_route(
    route: &Route<'_>,
    flags: SiteFeatureFlags,
    renderer: &impl OgRenderer,
    manifest: &CacheManifest,
    style_hash: &str,
    output_dir: &Path,
) -> Result<Option<Written>, GenerateError> {
    let output = route.relative_output();
    let output_path = output_dir.join(&output);
    let entry_hash = cache::hash_entry(route.entry)?;

    let status = match manifest.find_cached(&output, &entry_hash, style_hash, output_dir) {
        Some(stored) if stored == output => ImageStatus::Cached,
        Some(stored) => {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(output_dir.join(&stored), &output_path)?;
            ImageStatus::Copied
        }
        None => {
            let response = og::respond(route.entry, flags, renderer).map_err(|source| {
                GenerateError::Render {
                    route: route.path(),
                    source,
                }
            })?;
            let Some(bytes) = response.bytes() else {
                tracing::debug!(route = %route.path(), status = response.status, "skipped");
                return Ok(None);
            };
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, bytes)?;
            ImageStatus::Rendered
        }
    };

    tracing::debug!(route = %route.path(), ?status, "image written");
    Ok(Some(Written {
        route: route.path(),
        output,
        entry_hash,
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::tests::MockRenderer;
    use crate::scan::scan;
    use crate::test_helpers::{project_entry, setup_fixtures};
    use tempfile::TempDir;

    const STYLE: &str = "test-style";

    fn build(
        store: &ContentStore,
        flags: SiteFeatureFlags,
        renderer: &MockRenderer,
        out: &Path,
        use_cache: bool,
    ) -> Result<GenerateResult, GenerateError> {
        generate_with_renderer(store, flags, renderer, STYLE, out, use_cache, None)
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn writes_one_image_per_published_entry() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();
        let renderer = MockRenderer::new();

        let result = build(
            &site.store,
            SiteFeatureFlags::enabled(),
            &renderer,
            out.path(),
            true,
        )
        .unwrap();

        assert_eq!(
            sorted(result.written.clone()),
            vec![
                "posts/2024/year-in-review/index.png",
                "posts/hello-world/index.png",
                "projects/folio/index.png",
                "projects/telemetry-dashboard/index.png",
            ]
        );
        for rel in &result.written {
            let bytes = fs::read(out.path().join(rel)).unwrap();
            assert_eq!(&bytes[1..4], b"PNG");
        }
        assert!(!out.path().join("projects/lighthouse").exists());
        assert!(!out.path().join("posts/shipping-notes").exists());
        assert_eq!(result.cache_stats.misses, 4);
    }

    #[test]
    fn disabled_flag_writes_nothing() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();
        let renderer = MockRenderer::new();

        let result = build(
            &site.store,
            SiteFeatureFlags::disabled(),
            &renderer,
            out.path(),
            true,
        )
        .unwrap();

        assert!(result.written.is_empty());
        assert!(renderer.rendered_ids().is_empty());
        assert!(!out.path().join("projects").exists());
        assert!(!out.path().join("posts").exists());
    }

    #[test]
    fn second_build_is_fully_cached() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();

        build(&site.store, SiteFeatureFlags::enabled(), &MockRenderer::new(), out.path(), true)
            .unwrap();

        let renderer = MockRenderer::new();
        let result = build(
            &site.store,
            SiteFeatureFlags::enabled(),
            &renderer,
            out.path(),
            true,
        )
        .unwrap();

        assert!(renderer.rendered_ids().is_empty());
        assert_eq!(result.cache_stats.hits, 4);
        assert_eq!(result.cache_stats.misses, 0);
    }

    #[test]
    fn no_cache_rerenders_everything() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();

        build(&site.store, SiteFeatureFlags::enabled(), &MockRenderer::new(), out.path(), true)
            .unwrap();

        let renderer = MockRenderer::new();
        let result = build(
            &site.store,
            SiteFeatureFlags::enabled(),
            &renderer,
            out.path(),
            false,
        )
        .unwrap();

        assert_eq!(renderer.rendered_ids().len(), 4);
        assert_eq!(result.cache_stats.misses, 4);
    }

    #[test]
    fn changed_style_rerenders() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();

        build(&site.store, flags, &MockRenderer::new(), out.path(), true).unwrap();

        let renderer = MockRenderer::new();
        generate_with_renderer(&site.store, flags, &renderer, "other", out.path(), true, None)
            .unwrap();
        assert_eq!(renderer.rendered_ids().len(), 4);
    }

    #[test]
    fn edited_entry_rerenders_only_itself() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();

        let site = scan(tmp.path()).unwrap();
        build(&site.store, flags, &MockRenderer::new(), out.path(), true).unwrap();

        let path = tmp.path().join("src/data/projects/folio.md");
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replace("title: Folio", "title: Folio v2")).unwrap();

        let site = scan(tmp.path()).unwrap();
        let renderer = MockRenderer::new();
        let result = build(&site.store, flags, &renderer, out.path(), true).unwrap();

        assert_eq!(renderer.rendered_ids(), vec!["folio".to_string()]);
        assert_eq!(result.cache_stats.hits, 3);
    }

    #[test]
    fn moved_route_copies_previous_image() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();

        let site = scan(tmp.path()).unwrap();
        let old = site.store.get(Collection::Projects, "folio").unwrap().clone();
        let mut moved = old.clone();
        moved.id = "folio-site".to_string();

        let before = ContentStore::new(Vec::new(), vec![old]);
        build(&before, flags, &MockRenderer::with_bytes(b"card".to_vec()), out.path(), true)
            .unwrap();

        let after = ContentStore::new(Vec::new(), vec![moved]);
        let renderer = MockRenderer::new();
        let result = build(&after, flags, &renderer, out.path(), true).unwrap();

        assert!(renderer.rendered_ids().is_empty());
        assert_eq!(result.cache_stats.copies, 1);
        assert_eq!(
            fs::read(out.path().join("projects/folio-site/index.png")).unwrap(),
            b"card"
        );
        assert_eq!(result.removed, vec!["projects/folio/index.png"]);
        assert!(!out.path().join("projects/folio").exists());
    }

    #[test]
    fn entry_turned_draft_loses_its_image() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();

        let site = scan(tmp.path()).unwrap();
        build(&site.store, flags, &MockRenderer::new(), out.path(), true).unwrap();
        assert!(out.path().join("projects/folio/index.png").is_file());

        let path = tmp.path().join("src/data/projects/folio.md");
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replacen("---\n", "---\ndraft: true\n", 1)).unwrap();

        let site = scan(tmp.path()).unwrap();
        let result = build(&site.store, flags, &MockRenderer::new(), out.path(), true).unwrap();

        assert_eq!(result.removed, vec!["projects/folio/index.png"]);
        assert!(!out.path().join("projects/folio").exists());
        assert!(out.path().join("projects/telemetry-dashboard/index.png").is_file());
        assert_eq!(result.cache_stats.hits, 3);
        assert!(!CacheManifest::load(out.path())
            .entries
            .contains_key("projects/folio/index.png"));
    }

    #[test]
    fn disabling_generation_clears_previous_images() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();

        build(&site.store, SiteFeatureFlags::enabled(), &MockRenderer::new(), out.path(), true)
            .unwrap();
        let result = build(
            &site.store,
            SiteFeatureFlags::disabled(),
            &MockRenderer::new(),
            out.path(),
            true,
        )
        .unwrap();

        assert_eq!(result.removed.len(), 4);
        assert!(!out.path().join("projects").exists());
        assert!(!out.path().join("posts").exists());
        assert!(CacheManifest::load(out.path()).is_empty());
    }

    #[test]
    fn renamed_entry_without_cache_leaves_no_orphan() {
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();

        let before = ContentStore::new(Vec::new(), vec![project_entry("kiln", None)]);
        build(&before, flags, &MockRenderer::new(), out.path(), false).unwrap();

        let after = ContentStore::new(Vec::new(), vec![project_entry("kiln-log", None)]);
        let result = build(&after, flags, &MockRenderer::new(), out.path(), false).unwrap();

        assert_eq!(result.written, vec!["projects/kiln-log/index.png"]);
        assert_eq!(result.removed, vec!["projects/kiln/index.png"]);
        assert!(!out.path().join("projects/kiln").exists());
    }

    #[test]
    fn unrelated_output_files_survive_pruning() {
        let out = TempDir::new().unwrap();
        let page = out.path().join("projects/kiln/index.html");
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, "<html></html>").unwrap();

        let store = ContentStore::new(Vec::new(), vec![project_entry("kiln", Some(true))]);
        let result = build(&store, SiteFeatureFlags::enabled(), &MockRenderer::new(), out.path(), true)
            .unwrap();

        assert!(result.removed.is_empty());
        assert!(page.is_file());
    }

    #[test]
    fn identical_entries_stay_cached() {
        let out = TempDir::new().unwrap();
        let flags = SiteFeatureFlags::enabled();
        let store = ContentStore::new(
            Vec::new(),
            vec![project_entry("twin", None), {
                let mut other = project_entry("twin", None);
                other.id = "twin-b".to_string();
                other
            }],
        );

        build(&store, flags, &MockRenderer::new(), out.path(), true).unwrap();
        for _ in 0..2 {
            let result = build(&store, flags, &MockRenderer::new(), out.path(), true).unwrap();
            assert_eq!(result.cache_stats.hits, 2);
            assert_eq!(result.cache_stats.copies, 0);
        }
    }

    #[test]
    fn renderer_failure_aborts_with_route() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();
        let renderer = MockRenderer::failing("boom");

        let err = build(
            &site.store,
            SiteFeatureFlags::enabled(),
            &renderer,
            out.path(),
            true,
        )
        .unwrap_err();

        match err {
            GenerateError::Render { route, .. } => {
                assert!(route.ends_with("/index.png"), "unexpected route {route}");
            }
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn progress_events_cover_collections_and_images() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        generate_with_renderer(
            &site.store,
            SiteFeatureFlags::enabled(),
            &MockRenderer::new(),
            STYLE,
            out.path(),
            true,
            Some(tx),
        )
        .unwrap();

        let events: Vec<GenerateEvent> = rx.iter().collect();
        assert_eq!(
            events[0],
            GenerateEvent::CollectionStarted {
                collection: Collection::Blog,
                route_count: 2
            }
        );
        let written = events
            .iter()
            .filter(|e| matches!(e, GenerateEvent::ImageWritten { status: ImageStatus::Rendered, .. }))
            .count();
        assert_eq!(written, 4);
        assert!(events.contains(&GenerateEvent::CollectionStarted {
            collection: Collection::Projects,
            route_count: 2
        }));
    }

    #[test]
    fn generate_uses_configured_card_renderer() {
        let tmp = setup_fixtures();
        let mut site = scan(tmp.path()).unwrap();
        site.config.og.width = 400;
        site.config.og.height = 210;
        let out = TempDir::new().unwrap();

        let result = generate(&site, out.path(), true, None).unwrap();

        assert_eq!(result.written.len(), 4);
        let img = image::open(out.path().join("projects/folio/index.png")).unwrap();
        assert_eq!((img.width(), img.height()), (400, 210));
        assert!(cache::manifest_path(out.path()).exists());
    }
}
