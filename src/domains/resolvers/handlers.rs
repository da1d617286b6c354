//! Request handlers produced by routing resolvers.
//!
//! A handler follows a chain-of-responsibility convention: it either handles
//! the request and returns a response, or hands the request back untouched
//! with [`Outcome::Next`] so the dispatcher can try another candidate.

use async_trait::async_trait;
use axum::body::Body;
use http::{HeaderValue, Request, Response, StatusCode, Uri, header};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

use super::error::{HandlerError, HandlerResult};

/// The result of offering a request to a handler.
pub enum Outcome {
    /// The handler produced a response.
    Handled(Response<Body>),

    /// The handler declined; the request is returned for the next candidate.
    Next(Request<Body>),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled(response) => f.debug_tuple("Handled").field(&response.status()).finish(),
            Self::Next(request) => f.debug_tuple("Next").field(request.uri()).finish(),
        }
    }
}

/// A constructed request-processing unit.
#[async_trait]
pub trait Handler: Send + Sync + fmt::Debug {
    /// Offer `request` to this handler.
    async fn handle(&self, request: Request<Body>) -> HandlerResult<Outcome>;
}

/// Handlers are shared: caches own one reference, callers get clones.
pub type SharedHandler = Arc<dyn Handler>;

// ============================================================================
// Static directory handler
// ============================================================================

/// Serves files from a single base directory.
///
/// Missing files surface as [`HandlerError::NotFound`] instead of falling
/// through to another handler, and directories are never served (no index
/// file, no listing).
pub struct StaticDirectoryHandler {
    base_dir: PathBuf,
    mount_segment: Option<String>,
    cache_control: HeaderValue,
    serve_dir: ServeDir,
}

impl StaticDirectoryHandler {
    /// `max-age` used in production mode: one week.
    pub const PRODUCTION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Create a handler for `base_dir` whose responses may be cached for
    /// `max_age`.
    pub fn new(base_dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        let base_dir = base_dir.into();

        let mount_segment = base_dir
            .file_name()
            .and_then(|segment| segment.to_str())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);

        let cache_control = HeaderValue::try_from(format!("public, max-age={}", max_age.as_secs()))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=0"));

        let serve_dir = ServeDir::new(&base_dir).append_index_html_on_directories(false);

        Self {
            base_dir,
            mount_segment,
            cache_control,
            serve_dir,
        }
    }

    /// The directory files are served from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The `Cache-Control` value attached to served files.
    pub fn cache_control(&self) -> &HeaderValue {
        &self.cache_control
    }

    /// Drop a leading segment that repeats the base directory's own name, so
    /// that a directory mounted at `/assets` serves `/assets/x.js` from
    /// `<base>/x.js` rather than `<base>/assets/x.js`.
    fn strip_mount_segment(&self, request: &mut Request<Body>) {
        let Some(segment) = &self.mount_segment else {
            return;
        };
        let Some(stripped) = strip_redundant_segment(request.uri().path(), segment) else {
            return;
        };
        let Some(uri) = with_path(request.uri(), stripped) else {
            return;
        };

        debug!(
            segment = %segment,
            path = %uri.path(),
            "Removed redundant path segment from request"
        );
        *request.uri_mut() = uri;
    }
}

impl fmt::Debug for StaticDirectoryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticDirectoryHandler")
            .field("base_dir", &self.base_dir)
            .field("cache_control", &self.cache_control)
            .finish()
    }
}

#[async_trait]
impl Handler for StaticDirectoryHandler {
    async fn handle(&self, mut request: Request<Body>) -> HandlerResult<Outcome> {
        self.strip_mount_segment(&mut request);
        let path = request.uri().path().to_string();

        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path = %path, base_dir = %self.base_dir.display(), "File not found");
            return Err(HandlerError::not_found(path));
        }

        let (mut parts, body) = response.into_parts();
        if parts.status.is_success() || parts.status == StatusCode::NOT_MODIFIED {
            parts
                .headers
                .insert(header::CACHE_CONTROL, self.cache_control.clone());
        }

        Ok(Outcome::Handled(Response::from_parts(parts, Body::new(body))))
    }
}

/// If `path` starts with `/<segment>/`, return the remainder starting at the
/// second slash.
pub fn strip_redundant_segment<'a>(path: &'a str, segment: &str) -> Option<&'a str> {
    let rest = path.strip_prefix('/')?.strip_prefix(segment)?;
    rest.starts_with('/').then_some(rest)
}

/// Replace the path of `uri`, keeping its query string.
fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
