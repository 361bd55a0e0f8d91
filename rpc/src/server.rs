//! Router assembly and the listening server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use oracle_lifecycle::OracleController;
use oracle_utils::tracing_spans::http_span;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// State shared by every handler.
pub struct AppState {
    pub controller: OracleController,
}

/// All routes with CORS open to any origin and per-request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/initiate", post(handlers::initiate))
        .route("/register", post(handlers::register))
        .route("/update", post(handlers::update))
        .route("/query", post(handlers::query))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| http_span(req.method().as_str(), req.uri().path())),
        )
        .layer(cors)
        .with_state(state)
}

pub struct RpcServer {
    listen_addr: SocketAddr,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(listen_addr: SocketAddr, controller: OracleController) -> Self {
        Self {
            listen_addr,
            state: Arc::new(AppState { controller }),
        }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        info!(addr = %listener.local_addr()?, "HTTP API listening");
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
