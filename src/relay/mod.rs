//! Streaming relay: copy the resolved upstream audio stream to the client.
//!
//! The relay never buffers a whole body. Upstream bytes are re-chunked into
//! bounded frames and handed to the response as a lazy stream; transport
//! headers are curated rather than passed through wholesale.

pub mod filename;

use async_stream::try_stream;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures::Stream;

use crate::error::{Error, Result};

/// Upstream bodies are re-chunked to at most this many bytes per frame.
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Content type assumed when the upstream host does not declare one.
pub const FALLBACK_CONTENT_TYPE: &str = "audio/mpeg";

/// How the client is asked to treat the relayed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// Direct playback; seeking-capable clients are told ranges are accepted.
    Inline,
    /// Forced download via an attachment disposition.
    Attachment,
}

/// One open upstream connection ready to be streamed to a single client.
///
/// A session lives exactly as long as the response body it produces and is
/// owned by one request task; dropping the body closes the upstream
/// connection, which is how a client disconnect cancels the relay.
pub struct RelaySession {
    upstream: reqwest::Response,
    mode: RelayMode,
    filename: String,
    content_type: String,
    content_length: Option<u64>,
}

impl RelaySession {
    /// Open the upstream connection for `media_url`.
    ///
    /// Any transport failure or non-2xx upstream status collapses into
    /// [`Error::UpstreamUnreachable`]; the underlying cause goes to the log
    /// only. The media URL is a short-lived capability and is never logged
    /// in full; only its host appears in log lines.
    pub async fn open(
        client: &reqwest::Client,
        media_url: &str,
        mode: RelayMode,
        title: &str,
    ) -> Result<Self> {
        let host = url_host(media_url);

        let upstream = client.get(media_url).send().await.map_err(|e| {
            tracing::error!(host = %host, error = %e, "upstream connection failed");
            Error::UpstreamUnreachable
        })?;

        if !upstream.status().is_success() {
            tracing::error!(
                host = %host,
                status = %upstream.status(),
                "upstream refused the media request"
            );
            return Err(Error::UpstreamUnreachable);
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let content_length = upstream.content_length();

        let filename = match mode {
            RelayMode::Inline => filename::sanitize(title),
            RelayMode::Attachment => filename::for_download(title, &content_type),
        };

        Ok(Self {
            upstream,
            mode,
            filename,
            content_type,
            content_length,
        })
    }

    /// Consume the session into a streaming HTTP response.
    pub fn into_response(self) -> Response {
        let headers = response_headers(
            self.mode,
            &self.filename,
            &self.content_type,
            self.content_length,
        );

        let mut response = Response::new(Body::from_stream(chunk_stream(self.upstream)));
        *response.status_mut() = StatusCode::OK;
        *response.headers_mut() = headers;
        response
    }
}

/// Assemble the curated downstream header set for a relay response.
fn response_headers(
    mode: RelayMode,
    filename: &str,
    content_type: &str,
    content_length: Option<u64>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE)),
    );
    // Best-effort: omitted entirely when the upstream length is unknown.
    if let Some(len) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let disposition = match mode {
        RelayMode::Inline => {
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            format!("inline; filename=\"{filename}\"")
        }
        RelayMode::Attachment => format!("attachment; filename=\"{filename}\""),
    };
    // Sanitized filenames are visible ASCII; this parse cannot fail.
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    headers
}

/// Re-chunk the upstream body into frames of at most [`CHUNK_SIZE`] bytes.
///
/// The stream is finite (it ends when upstream signals end-of-body) and not
/// restartable. An upstream failure mid-stream surfaces as an `io::Error`
/// item, which tears down the downstream connection; headers are already
/// committed at that point, so there is nothing else to send.
fn chunk_stream(mut upstream: reqwest::Response) -> impl Stream<Item = std::io::Result<Bytes>> {
    try_stream! {
        loop {
            let next = upstream.chunk().await.map_err(|e| {
                tracing::warn!(error = %e, "upstream stream failed mid-relay");
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            let mut chunk = match next {
                Some(chunk) => chunk,
                None => break,
            };
            while chunk.len() > CHUNK_SIZE {
                yield chunk.split_to(CHUNK_SIZE);
            }
            if !chunk.is_empty() {
                yield chunk;
            }
        }
    }
}

/// Host portion of a URL, for logging. The full URL is treated as a secret.
fn url_host(url: &str) -> &str {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn inline_headers() {
        let headers = response_headers(RelayMode::Inline, "Song", "audio/mpeg", Some(1_000_000));
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "audio/mpeg");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "1000000");
        assert_eq!(headers.get(header::ACCEPT_RANGES).unwrap(), "bytes");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "inline; filename=\"Song\""
        );
    }

    #[test]
    fn attachment_headers() {
        let headers = response_headers(RelayMode::Attachment, "Song.mp3", "audio/mpeg", None);
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"Song.mp3\""
        );
        // No length claim when upstream did not declare one, and no range
        // support advertised for forced downloads.
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert!(headers.get(header::ACCEPT_RANGES).is_none());
    }

    #[test]
    fn url_host_extraction() {
        assert_eq!(url_host("https://cdn.example.com/p/file.mp3?sig=x"), "cdn.example.com");
        assert_eq!(url_host("cdn.example.com/file"), "cdn.example.com");
    }

    #[tokio::test]
    async fn chunk_stream_bounds_frame_size() {
        // 100 KiB served as one upstream response must come out re-chunked.
        let body = vec![7u8; 100 * 1024];
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let upstream = reqwest::get(server.uri()).await.unwrap();
        let mut stream = Box::pin(chunk_stream(upstream));

        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            assert!(chunk.len() <= CHUNK_SIZE);
            assert!(!chunk.is_empty());
            total += chunk.len();
        }
        assert_eq!(total, body.len());
    }
}
