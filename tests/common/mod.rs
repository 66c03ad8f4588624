//! Shared test harness for integration tests.
//!
//! Spawns the full router on a random port with an injectable resolver, and
//! provides canned resolver doubles so HTTP-level tests never shell out.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use audiorelay::config::Config;
use audiorelay::error::{Error, Result};
use audiorelay::resolver::{Resolution, ResolveRequest, Resolver};
use audiorelay::server::{build_router, AppContext};

/// Resolver double returning a fixed resolution.
pub struct StaticResolver(pub Resolution);

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, _request: &ResolveRequest) -> Result<Resolution> {
        Ok(self.0.clone())
    }
}

/// Resolver double that always fails with the constructed error.
pub struct FailingResolver(pub fn() -> Error);

#[async_trait]
impl Resolver for FailingResolver {
    async fn resolve(&self, _request: &ResolveRequest) -> Result<Resolution> {
        Err((self.0)())
    }
}

/// Start the full router on a random port with the given resolver.
pub async fn spawn_server(resolver: Arc<dyn Resolver>) -> SocketAddr {
    let ctx = AppContext::new(Config::default(), resolver).expect("failed to build context");
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// Resolution carrying only a direct media URL, as line-mode output would.
pub fn direct_resolution(title: &str, media_url: &str) -> Resolution {
    Resolution {
        title: title.to_string(),
        duration_secs: None,
        uploader: None,
        thumbnail: None,
        media_url: Some(media_url.to_string()),
        formats: Vec::new(),
    }
}
