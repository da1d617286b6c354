//! Upward server implementation and lifecycle management.
//!
//! The server loads the definition document, validates it with a warm-up
//! resolution, and dispatches each request through the handler that the
//! document's entry property resolves to.
//!
//! Resolution happens per request. Expensive handlers are shared through the
//! resolvers' caches, so repeated resolution is cheap.

use axum::body::Body;
use http::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::config::Config;
use super::error::Result;
use crate::domains::definition::Document;
use crate::domains::resolvers::{
    Environment, HandlerError, Outcome, ResolutionService, ResolverOptions, ResolverRegistry,
};

/// The request dispatcher.
#[derive(Clone)]
pub struct UpwardServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Service resolving the definition document.
    service: Arc<ResolutionService>,
}

impl UpwardServer {
    /// Load the configured document and build the server.
    pub async fn load(config: Config) -> Result<Self> {
        let document = Document::load(&config.definition.path).await?;
        Self::from_document(config, document, Environment::from_process()).await
    }

    /// Build the server around an already parsed document.
    ///
    /// Fails if the entry property does not resolve to a handler.
    pub async fn from_document(
        config: Config,
        document: Document,
        environment: Environment,
    ) -> Result<Self> {
        let registry = ResolverRegistry::with_defaults(&ResolverOptions::from_config(&config))?;
        Self::with_registry(config, document, registry, environment).await
    }

    /// Build the server with a caller-supplied resolver registry.
    pub async fn with_registry(
        config: Config,
        document: Document,
        registry: ResolverRegistry,
        environment: Environment,
    ) -> Result<Self> {
        let service = ResolutionService::new(document, registry, environment);

        let server = Self {
            config: Arc::new(config),
            service: Arc::new(service),
        };
        server.warm_up().await?;

        Ok(server)
    }

    /// Resolve the entry once so configuration errors surface at startup.
    async fn warm_up(&self) -> Result<()> {
        let entry = &self.config.definition.entry;
        let handler = self.service.resolve_handler(entry).await?;
        info!("Entry property '{}' resolved to {:?}", entry, handler);
        Ok(())
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn service(&self) -> &ResolutionService {
        &self.service
    }

    /// Serve one request.
    ///
    /// `Next` and missing files become 404; resolution failures become 500.
    #[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let entry = &self.config.definition.entry;

        let handler = match self.service.resolve_handler(entry).await {
            Ok(handler) => handler,
            Err(e) => {
                error!("Failed to resolve '{}': {}", entry, e);
                return status_response(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        match handler.handle(request).await {
            Ok(Outcome::Handled(response)) => response,
            Ok(Outcome::Next(request)) => {
                debug!("No handler accepted {}", request.uri());
                status_response(StatusCode::NOT_FOUND)
            }
            Err(e @ HandlerError::NotFound { .. }) => {
                debug!("{}", e);
                status_response(e.status())
            }
            Err(e) => {
                warn!("Handler failed: {}", e);
                status_response(e.status())
            }
        }
    }
}

/// A plain-text response carrying the status's canonical reason.
fn status_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(status.canonical_reason().unwrap_or("")));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::domains::definition::Definition;
    use crate::domains::resolvers::{
        Artifact, Handler, HandlerResult, Resolver, ResolverError, ResolverResult, Visitor,
    };
    use http_body_util::BodyExt;
    use std::fs;
    use tempfile::TempDir;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist").join("assets")).unwrap();
        fs::write(dir.path().join("dist").join("assets").join("app.js"), "app").unwrap();
        fs::write(dir.path().join("dist-name.txt"), "dist/assets").unwrap();
        dir
    }

    async fn server(dir: &TempDir, yaml: &str) -> Result<UpwardServer> {
        let path = dir.path().join("upward.yml");
        fs::write(&path, yaml).unwrap();

        let mut config = Config::default();
        config.definition.path = path;
        UpwardServer::load(config).await
    }

    #[tokio::test]
    async fn test_dispatch_serves_files() {
        let dir = site();
        let server = server(&dir, "handler:\n  directory: dist/assets\n")
            .await
            .unwrap();

        let response = server.dispatch(get("/assets/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "app");
    }

    #[tokio::test]
    async fn test_dispatch_missing_file_is_404() {
        let dir = site();
        let server = server(&dir, "handler:\n  directory: dist/assets\n")
            .await
            .unwrap();

        let response = server.dispatch(get("/nope.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_load_fails_fast_on_bad_definition() {
        let dir = site();
        let result = server(&dir, "handler:\n  directory: 42\n").await;
        assert!(matches!(
            result,
            Err(Error::Resolver(ResolverError::InvalidType { .. }))
        ));

        let result = server(&dir, "handler:\n  directory: \"\"\n").await;
        assert!(matches!(
            result,
            Err(Error::Resolver(ResolverError::MissingProperty { .. }))
        ));

        let result = server(&dir, "handler:\n  inline: text\n").await;
        assert!(matches!(
            result,
            Err(Error::Resolver(ResolverError::NotAHandler { .. }))
        ));
    }

    #[derive(Debug)]
    struct DecliningHandler;

    #[async_trait::async_trait]
    impl Handler for DecliningHandler {
        async fn handle(&self, request: Request<Body>) -> HandlerResult<Outcome> {
            Ok(Outcome::Next(request))
        }
    }

    struct DecliningResolver;

    #[async_trait::async_trait]
    impl Resolver for DecliningResolver {
        fn resolver_type(&self) -> &'static str {
            "decline"
        }

        fn telltale(&self) -> &'static str {
            "decline"
        }

        async fn resolve(
            &self,
            _visitor: &Visitor<'_>,
            _definition: &Definition,
        ) -> ResolverResult<Artifact> {
            Ok(Artifact::Handler(Arc::new(DecliningHandler)))
        }
    }

    #[tokio::test]
    async fn test_dispatch_declined_request_is_404() {
        let mut registry = ResolverRegistry::with_defaults(&ResolverOptions::default()).unwrap();
        registry.register(DecliningResolver).unwrap();
        let document =
            Document::parse("handler:\n  decline: true\n", "/srv/app/upward.yml").unwrap();

        let server = UpwardServer::with_registry(
            Config::default(),
            document,
            registry,
            Environment::default(),
        )
        .await
        .unwrap();

        let response = server.dispatch(get("/anything")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_load_missing_document() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.definition.path = dir.path().join("absent.yml");

        let result = UpwardServer::load(config).await;
        assert!(matches!(result, Err(Error::Definition(_))));
    }

    #[tokio::test]
    async fn test_dispatch_resolution_failure_is_500() {
        let dir = site();
        let server = server(
            &dir,
            "handler:\n  directory:\n    file: dist-name.txt\n",
        )
        .await
        .unwrap();

        let response = server.dispatch(get("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);

        // The directory name is re-read on every resolution.
        fs::remove_file(dir.path().join("dist-name.txt")).unwrap();
        let response = server.dispatch(get("/app.js")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_custom_entry_property() {
        let dir = site();
        let path = dir.path().join("upward.yml");
        fs::write(&path, "routes:\n  directory: dist/assets\n").unwrap();

        let mut config = Config::default();
        config.definition.path = path;
        config.definition.entry = "routes".to_string();
        let server = UpwardServer::load(config).await.unwrap();

        let response = server.dispatch(get("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
