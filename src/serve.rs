//! Local preview server for social-preview images.
//!
//! Routes are enumerated once when the server starts. The site
//! configuration is re-read on every request, so turning
//! `dynamic_og_image` off while the server runs makes every previously
//! enumerated route answer `404`, exactly like a stale route would in
//! production.
//!
//! | Request | Response |
//! |---|---|
//! | enumerated route, generation enabled | `200 image/png` |
//! | enumerated route, generation disabled | `404`, empty body |
//! | any other path | `404`, empty body |
//! | renderer or config failure | `500 text/plain` with the error |

use crate::config::{self, ConfigError, SiteFeatureFlags};
use crate::content::{Collection, ContentEntry};
use crate::og::{self, ImageResponse};
use crate::render::{CardRenderer, OgRenderer, RenderError};
use crate::scan::{ContentStore, Site};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

pub const DEFAULT_PORT: u16 = 4321;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {0}")]
    Bind(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Path → entry lookup for the enumerated image routes.
#[derive(Debug, Default)]
pub struct RouteTable<'a> {
    routes: HashMap<String, &'a ContentEntry>,
}

impl<'a> RouteTable<'a> {
    pub fn from_store(store: &'a ContentStore, flags: SiteFeatureFlags) -> Self {
        let routes = Collection::ALL
            .into_iter()
            .flat_map(|c| og::enumerate_routes(store.list_entries(c), flags))
            .map(|route| (route.path(), route.entry))
            .collect();
        Self { routes }
    }

    pub fn get(&self, path: &str) -> Option<&'a ContentEntry> {
        self.routes.get(path).copied()
    }

    /// All route paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Resolve a request path against the route table and answer it.
///
/// Query strings are ignored. Unknown paths get the same empty `404` the
/// handler gives when generation is disabled.
pub fn dispatch(
    path: &str,
    table: &RouteTable<'_>,
    flags: SiteFeatureFlags,
    renderer: &(impl OgRenderer + ?Sized),
) -> Result<ImageResponse, RenderError> {
    let path = path.split(&['?', '#'][..]).next().unwrap_or(path);
    match table.get(path) {
        Some(entry) => og::respond(entry, flags, renderer),
        None => Ok(ImageResponse::not_found()),
    }
}

/// What goes back over the wire for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    fn error(message: String) -> Self {
        Self {
            status: 500,
            content_type: Some("text/plain; charset=utf-8"),
            body: message.into_bytes(),
        }
    }
}

impl From<ImageResponse> for Reply {
    fn from(response: ImageResponse) -> Self {
        let content_type = response.content_type();
        Self {
            status: response.status,
            content_type,
            body: response.body.map(|b| b.bytes).unwrap_or_default(),
        }
    }
}

/// Answer one request path with the configuration currently on disk.
pub fn handle_path(path: &str, site_root: &Path, table: &RouteTable<'_>) -> Reply {
    let config = match config::load_config(site_root) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config reload failed: {e}");
            return Reply::error(format!("Config error: {e}"));
        }
    };
    let renderer = match CardRenderer::from_config(&config.og) {
        Ok(renderer) => renderer,
        Err(e) => return Reply::error(e.to_string()),
    };
    match dispatch(path, table, config.feature_flags(), &renderer) {
        Ok(response) => Reply::from(response),
        Err(e) => {
            tracing::warn!(path, "render failed: {e}");
            Reply::error(e.to_string())
        }
    }
}

/// A bound server, ready to run.
pub struct PreviewServer {
    server: Server,
    addr: String,
}

/// Bind the preview server on localhost. Port `0` picks a free port.
pub fn bind(port: u16) -> Result<PreviewServer, ServeError> {
    let requested = format!("127.0.0.1:{port}");
    let server =
        Server::http(&requested).map_err(|e| ServeError::Bind(format!("{requested}: {e}")))?;
    let addr = server
        .server_addr()
        .to_ip()
        .map_or(requested, |a| a.to_string());
    Ok(PreviewServer { server, addr })
}

impl PreviewServer {
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Serve requests until the process is stopped.
    pub fn run(self, site: &Site) -> Result<(), ServeError> {
        let table = RouteTable::from_store(&site.store, site.config.feature_flags());
        tracing::info!(routes = table.len(), addr = %self.addr, "preview server ready");

        for request in self.server.incoming_requests() {
            let reply = handle_path(request.url(), &site.root, &table);
            tracing::debug!(url = request.url(), status = reply.status, "request");
            if let Err(e) = send(request, reply) {
                tracing::warn!("failed to send response: {e}");
            }
        }
        Ok(())
    }
}

/// Write a reply to the client. tiny_http picks the reason phrase from the
/// status code, so a 404 goes out as "Not Found".
fn send(request: Request, reply: Reply) -> Result<(), ServeError> {
    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    if let Some(content_type) = reply.content_type {
        response = with_content_type(response, content_type);
    }
    request.respond(response)?;
    Ok(())
}

fn with_content_type<R: Read>(response: Response<R>, value: &str) -> Response<R> {
    match Header::from_bytes(&b"Content-Type"[..], value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
