//! Request handlers for the resolve-then-relay endpoints.
//!
//! `/play` and `/download` share one pipeline (validate, resolve, select
//! the audio URL, relay) and differ only in the disposition mode applied
//! by the relay.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::Deserialize;
use serde_json::json;

use super::error::AppError;
use super::AppContext;
use crate::error::Error;
use crate::relay::{RelayMode, RelaySession};
use crate::resolver::{self, ResolveRequest};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    url: Option<String>,
}

/// GET /play?url=...
///
/// Resolve and stream for inline playback.
pub async fn play(
    State(ctx): State<AppContext>,
    Query(params): Query<StreamQuery>,
) -> Result<Response, AppError> {
    stream_source(ctx, params, RelayMode::Inline).await
}

/// GET /download?url=...
///
/// Resolve and stream as a forced download.
pub async fn download(
    State(ctx): State<AppContext>,
    Query(params): Query<StreamQuery>,
) -> Result<Response, AppError> {
    stream_source(ctx, params, RelayMode::Attachment).await
}

/// Shared pipeline for both endpoints.
///
/// A failure before [`RelaySession::open`] never touches the upstream host;
/// a failure after the response body starts is terminal for the connection
/// and handled inside the relay.
async fn stream_source(
    ctx: AppContext,
    params: StreamQuery,
    mode: RelayMode,
) -> Result<Response, AppError> {
    let source_url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput("missing url parameter".into()))?;

    // Reject unknown platforms before anything is spawned or fetched.
    if !resolver::accepts_source_url(&source_url) {
        return Err(Error::InvalidInput(source_url).into());
    }

    let request = ResolveRequest {
        source_url,
        want_metadata: true,
    };
    let resolution = ctx.resolver.resolve(&request).await?;

    let media_url = resolver::select_audio_url(&resolution).ok_or(Error::NoAudioStream)?;

    tracing::info!(title = %resolution.title, ?mode, "relaying audio stream");
    let session = RelaySession::open(&ctx.http, media_url, mode, &resolution.title).await?;
    Ok(session.into_response())
}

/// GET /
///
/// Static JSON description of the available endpoints.
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "audiorelay",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "play": "/play?url=<video page URL>",
            "download": "/download?url=<video page URL>",
        },
    }))
}

/// GET /health
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
