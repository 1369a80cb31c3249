//! Typed content collections.
//!
//! Two collections make up the site: `blog` (posts) and `projects`. Each entry
//! is a Markdown file whose front matter is validated against the collection's
//! schema when the store loads it. By the time an entry reaches the image
//! pipeline it is well-formed and immutable.
//!
//! ## Blog schema
//!
//! | Key | Type | Default |
//! |---|---|---|
//! | `author` | string | site author |
//! | `pubDatetime` | date | required |
//! | `modDatetime` | date, nullable | none |
//! | `title` | string | required |
//! | `featured` | bool | none |
//! | `draft` | bool | unset (published) |
//! | `tags` | string list | `["others"]` |
//! | `ogImage` | image path or URL | none |
//! | `description` | string | required |
//! | `canonicalURL` | string | none |
//! | `hideEditPost` | bool | none |
//! | `timezone` | string | none |
//!
//! ## Project schema
//!
//! | Key | Type | Default |
//! |---|---|---|
//! | `title`, `description` | string | required |
//! | `descriptionDe` | string | none |
//! | `pubDatetime` | date | required |
//! | `techStack`, `keywords` | string list | `[]` |
//! | `liveUrl`, `githubUrl` | string | none |
//! | `image`, `logo` | image path or URL | none |
//! | `featured`, `draft` | bool | none |
//!
//! Unknown keys are ignored.

use crate::config::ContentConfig;
use crate::frontmatter::Document;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("{path}: {message}")]
    Schema { path: PathBuf, message: String },
    #[error("Unknown collection: {0} (expected blog or projects)")]
    UnknownCollection(String),
}

/// A content collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blog,
    Projects,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Blog, Collection::Projects];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Blog => "blog",
            Collection::Projects => "projects",
        }
    }

    /// First path segment of this collection's public routes.
    pub fn route_root(self) -> &'static str {
        match self {
            Collection::Blog => "posts",
            Collection::Projects => "projects",
        }
    }

    /// Collection directory, relative to the site root.
    pub fn dir(self, content: &ContentConfig) -> &str {
        match self {
            Collection::Blog => &content.blog_dir,
            Collection::Projects => &content.projects_dir,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" | "posts" => Ok(Collection::Blog),
            "projects" => Ok(Collection::Projects),
            other => Err(ContentError::UnknownCollection(other.to_string())),
        }
    }
}

/// An image reference in front matter: either a file shipped with the
/// content, or a public path / remote URL the site serves as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImageRef {
    /// Local asset. Relative to the entry file until the store resolves it.
    Asset(PathBuf),
    /// Public path (`/images/x.png`) or absolute URL.
    Url(String),
}

impl ImageRef {
    /// Classify a raw front matter value.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('/') || raw.contains("://") {
            ImageRef::Url(raw.to_string())
        } else {
            ImageRef::Asset(PathBuf::from(raw))
        }
    }

    /// Anchor a relative asset path. `@/` paths resolve against the site's
    /// `src/` directory, everything else against the entry's directory.
    pub fn resolve(self, entry_dir: &Path, site_root: &Path) -> Self {
        match self {
            ImageRef::Asset(path) => {
                let resolved = match path.strip_prefix("@") {
                    Ok(rest) => site_root.join("src").join(rest),
                    Err(_) => entry_dir.join(path),
                };
                ImageRef::Asset(resolved)
            }
            url => url,
        }
    }

    pub fn as_asset(&self) -> Option<&Path> {
        match self {
            ImageRef::Asset(path) => Some(path),
            ImageRef::Url(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImageRef::parse(&raw))
    }
}

/// Parse a front matter date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` (UTC) and bare
/// `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn deserialize_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_datetime(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date {raw:?}")))
}

fn deserialize_optional_datetime<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date {raw:?}"))),
    }
}

fn default_tags() -> Vec<String> {
    vec!["others".to_string()]
}

/// Front matter of a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub author: String,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub pub_datetime: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub mod_datetime: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub og_image: Option<ImageRef>,
    pub description: String,
    #[serde(default, rename = "canonicalURL")]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub hide_edit_post: Option<bool>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Front matter of a project entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub description_de: Option<String>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub pub_datetime: DateTime<Utc>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Collection-typed entry data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "collection", rename_all = "lowercase")]
pub enum EntryData {
    Blog(BlogPost),
    Projects(Project),
}

/// A single validated record from a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    /// Stable identifier, unique within the collection.
    pub id: String,
    /// Source file, relative to the site root.
    pub source_path: PathBuf,
    /// Markdown body after the front matter.
    pub body: String,
    pub data: EntryData,
}

/// Where an entry was read from, for resolving relative references.
pub struct EntrySource<'a> {
    pub site_root: &'a Path,
    /// Source file, relative to the site root.
    pub relative_path: &'a Path,
    pub site_author: &'a str,
}

impl ContentEntry {
    /// Validate a parsed document against its collection's schema.
    ///
    /// Applies schema defaults (blog `author` falls back to the site author)
    /// and anchors relative image assets next to the source file.
    pub fn from_document(
        collection: Collection,
        id: String,
        document: Document,
        source: &EntrySource<'_>,
    ) -> Result<Self, ContentError> {
        let Document { mut data, body } = document;
        let entry_dir = source
            .site_root
            .join(source.relative_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source.site_root.to_path_buf());
        let schema_error = |e: serde_yaml::Error| ContentError::Schema {
            path: source.relative_path.to_path_buf(),
            message: e.to_string(),
        };

        let data = match collection {
            Collection::Blog => {
                let author_key = Value::String("author".to_string());
                if !data.contains_key(&author_key) {
                    data.insert(author_key, Value::String(source.site_author.to_string()));
                }
                let mut post: BlogPost =
                    serde_yaml::from_value(Value::Mapping(data)).map_err(schema_error)?;
                post.og_image = post
                    .og_image
                    .map(|img| img.resolve(&entry_dir, source.site_root));
                EntryData::Blog(post)
            }
            Collection::Projects => {
                let mut project: Project =
                    serde_yaml::from_value(Value::Mapping(data)).map_err(schema_error)?;
                project.image = project
                    .image
                    .map(|img| img.resolve(&entry_dir, source.site_root));
                project.logo = project
                    .logo
                    .map(|img| img.resolve(&entry_dir, source.site_root));
                EntryData::Projects(project)
            }
        };

        Ok(Self {
            id,
            source_path: source.relative_path.to_path_buf(),
            body,
            data,
        })
    }

    pub fn collection(&self) -> Collection {
        match self.data {
            EntryData::Blog(_) => Collection::Blog,
            EntryData::Projects(_) => Collection::Projects,
        }
    }

    /// The raw `draft` flag; `None` when the key is absent.
    pub fn draft(&self) -> Option<bool> {
        match &self.data {
            EntryData::Blog(post) => post.draft,
            EntryData::Projects(project) => project.draft,
        }
    }

    pub fn title(&self) -> &str {
        match &self.data {
            EntryData::Blog(post) => &post.title,
            EntryData::Projects(project) => &project.title,
        }
    }

    pub fn description(&self) -> &str {
        match &self.data {
            EntryData::Blog(post) => &post.description,
            EntryData::Projects(project) => &project.description,
        }
    }

    pub fn pub_datetime(&self) -> DateTime<Utc> {
        match &self.data {
            EntryData::Blog(post) => post.pub_datetime,
            EntryData::Projects(project) => project.pub_datetime,
        }
    }

    /// Tags for posts, tech stack for projects.
    pub fn labels(&self) -> &[String] {
        match &self.data {
            EntryData::Blog(post) => &post.tags,
            EntryData::Projects(project) => &project.tech_stack,
        }
    }

    /// Cover image shown on the social card: `ogImage` for posts, `image`
    /// for projects.
    pub fn cover(&self) -> Option<&ImageRef> {
        match &self.data {
            EntryData::Blog(post) => post.og_image.as_ref(),
            EntryData::Projects(project) => project.image.as_ref(),
        }
    }

    /// Byline for the card: post author, or nothing for projects.
    pub fn byline(&self) -> Option<&str> {
        match &self.data {
            EntryData::Blog(post) => Some(&post.author),
            EntryData::Projects(_) => None,
        }
    }
}
