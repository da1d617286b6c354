//! HTTP transport implementation.
//!
//! Every request is dispatched through the definition document, except the
//! optional health endpoint.

use axum::{
    Json, Router,
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::UpwardServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the router that serves `server`.
    pub fn router(&self, server: UpwardServer) -> Router {
        let mut app: Router<UpwardServer> = Router::new();

        if let Some(path) = &self.config.health_path {
            app = app.route(path, get(health_check));
        }

        let mut app = app
            .fallback(dispatch)
            .with_state(server)
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: UpwardServer) -> TransportResult<()> {
        let addr = self.address();
        info!("Starting transport: {}", self.config.description());

        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        if let Some(path) = &self.config.health_path {
            info!("  → Health: GET {}", path);
        }

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Health check endpoint.
async fn health_check(State(server): State<UpwardServer>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "name": server.name(),
        "version": server.version(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Hand the request to the definition document.
async fn dispatch(State(server): State<UpwardServer>, request: Request) -> Response {
    server.dispatch(request).await
}
