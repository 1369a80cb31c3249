//! Entry identifiers derived from file paths.
//!
//! Every content entry is addressed by a stable identifier that doubles as the
//! dynamic segment of its routes. Identifiers come from the entry's path inside
//! its collection directory, with the extension removed and every path segment
//! slugified:
//!
//! - `my-first-post.md` → `my-first-post`
//! - `2024/Hello World.md` → `2024/hello-world`
//! - `Rust & WASM!.md` → `rust--wasm`
//!
//! A front matter `slug` replaces the derived identifier verbatim, which is
//! how authors keep URLs stable across file renames. It must already be in
//! slug form (see [`is_valid_slug`]): identifiers become output paths, so
//! `..`, `.` and backslashes never get through.

use std::path::{Component, Path};

/// Slugify a single path segment.
///
/// Lowercases, maps whitespace to `-`, keeps alphanumerics (including
/// non-ASCII letters), `-` and `_`, and drops everything else. Adjacent
/// separators are not collapsed, so `a & b` becomes `a--b`.
pub fn slugify(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Derive an entry identifier from its path relative to the collection root.
///
/// Returns `None` if nothing slug-worthy remains (e.g. `"!!!.md"`).
pub fn entry_id(relative: &Path) -> Option<String> {
    let without_ext = relative.with_extension("");
    let segments: Vec<String> = without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(slugify(&s.to_string_lossy())),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Whether a front matter `slug` can be used as an identifier as-is.
///
/// Each `/`-separated segment must be non-empty and unchanged by
/// [`slugify`].
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .split('/')
            .all(|segment| !segment.is_empty() && slugify(segment) == segment)
}

/// Whether a collection file should be loaded.
///
/// Collections pick up `**/[^_]*.md`: Markdown files whose name does not
/// start with an underscore. Underscored files are partials and notes.
pub fn is_entry_file(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("md"));
    let is_partial = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'));
    is_markdown && !is_partial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes_spaces() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn slugify_keeps_dashes_and_underscores() {
        assert_eq!(slugify("my_post-v2"), "my_post-v2");
    }

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("Rust & WASM!"), "rust--wasm");
        assert_eq!(slugify("what's new?"), "whats-new");
    }

    #[test]
    fn slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Über Café"), "über-café");
    }

    #[test]
    fn entry_id_strips_extension() {
        assert_eq!(
            entry_id(Path::new("my-first-post.md")).as_deref(),
            Some("my-first-post")
        );
    }

    #[test]
    fn entry_id_keeps_nested_directories() {
        assert_eq!(
            entry_id(Path::new("2024/Hello World.md")).as_deref(),
            Some("2024/hello-world")
        );
    }

    #[test]
    fn entry_id_none_when_nothing_remains() {
        assert_eq!(entry_id(Path::new("!!!.md")), None);
    }

    #[test]
    fn valid_slugs() {
        assert!(is_valid_slug("shipping-notes"));
        assert!(is_valid_slug("2024/year-in-review"));
        assert!(is_valid_slug("my_post-v2"));
    }

    #[test]
    fn slugs_that_could_leave_the_collection_rejected() {
        for slug in [
            "",
            "..",
            "../../escaped",
            "a/../b",
            "./a",
            "a//b",
            "a\\b",
            "..\\escaped",
            "Has Spaces",
            "v1.2",
        ] {
            assert!(!is_valid_slug(slug), "{slug:?} accepted");
        }
    }

    #[test]
    fn entry_file_filter() {
        assert!(is_entry_file(Path::new("post.md")));
        assert!(is_entry_file(Path::new("nested/POST.MD")));
        assert!(!is_entry_file(Path::new("_draft-notes.md")));
        assert!(!is_entry_file(Path::new("nested/_partial.md")));
        assert!(!is_entry_file(Path::new("cover.png")));
        assert!(!is_entry_file(Path::new("README")));
    }
}
