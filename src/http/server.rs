//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the engine in an Axum router with a single fallback service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Buffer request bodies and dispatch off the async workers
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request as HttpRequest, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::http::middleware::recovery::INTERNAL_SERVER_ERROR_BODY;
use crate::http::request::Request;
use crate::http::request_id::{UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub max_body_bytes: usize,
}

/// HTTP front end for an [`Engine`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Freezes `engine` and builds the service stack around it.
    pub fn new(config: ServerConfig, engine: Engine) -> Self {
        let state = AppState {
            engine: Arc::new(engine),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new().fallback(dispatch).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// The complete service, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the body, then runs the engine on the blocking pool.
async fn dispatch(State(state): State<AppState>, request: HttpRequest<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Rejected request body");
            metrics::record_request(&method, 413, "none", start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = Request::from_parts(parts, body);
    let engine = state.engine.clone();

    match tokio::task::spawn_blocking(move || engine.handle(request)).await {
        Ok(ctx) => {
            let route = ctx.matched_pattern().unwrap_or("none").to_string();
            metrics::record_request(&method, ctx.status_code().as_u16(), &route, start_time);
            ctx.into_response()
        }
        Err(e) => {
            // only reachable when no recovery middleware is installed
            tracing::error!(error = %e, "Request handler failed outside recovery");
            metrics::record_request(&method, 500, "none", start_time);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY).into_response()
        }
    }
}
