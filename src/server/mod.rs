//! HTTP server assembly: shared context, router, startup and shutdown.

pub mod error;
pub mod routes_stream;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::resolver::Resolver;

/// Shared application context handed to every request handler.
///
/// Cheap to clone; everything inside is read-only after startup. Request
/// state never lives here, so two requests for the same source URL run
/// fully independently.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub resolver: Arc<dyn Resolver>,
    /// Shared upstream HTTP client. The spoofed identity and the connect
    /// timeout are baked in at construction.
    pub http: reqwest::Client,
}

impl AppContext {
    pub fn new(config: Config, resolver: Arc<dyn Resolver>) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.relay.user_agent.as_str())
            .connect_timeout(config.relay.connect_timeout)
            .build()
            .map_err(|e| crate::error::Error::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            resolver,
            http,
        })
    }
}

/// Create the Axum router with all routes.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes_stream::index))
        .route("/health", get(routes_stream::health_check))
        .route("/play", get(routes_stream::play))
        .route("/download", get(routes_stream::download))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server and block until shutdown.
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = build_router(ctx);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
