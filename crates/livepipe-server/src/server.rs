//! `LivepipeServer`: the Axum HTTP server.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use livepipe_hydrate::ReactionService;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::SessionVerifier;
use crate::config::ServerConfig;
use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub reactions: Arc<ReactionService>,
    pub verifier: Arc<dyn SessionVerifier>,
    /// When the server started.
    pub start_time: Instant,
}

pub struct LivepipeServer {
    config: ServerConfig,
    reactions: Arc<ReactionService>,
    verifier: Arc<dyn SessionVerifier>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl LivepipeServer {
    pub fn new(
        config: ServerConfig,
        reactions: ReactionService,
        verifier: Arc<dyn SessionVerifier>,
    ) -> Self {
        Self {
            config,
            reactions: Arc::new(reactions),
            verifier,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            reactions: self.reactions.clone(),
            verifier: self.verifier.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/api/livestream/{livestream_id}/reaction",
                get(handlers::list_reactions).post(handlers::post_reaction),
            )
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Serve on `listener` until the shutdown coordinator fires.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        info!(%addr, "livepipe listening");

        let token = self.shutdown.token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!("livepipe stopped");
        Ok(())
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}
