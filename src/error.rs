//! Unified error type for the audiorelay service.
//!
//! Every failure mode in the resolve-then-relay pipeline funnels into
//! [`Error`], which carries enough context for the HTTP layer to derive a
//! status code via [`Error::http_status`].

/// Unified error type covering all failure modes in audiorelay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied source URL is missing or not an accepted platform link.
    #[error("Invalid source URL: {0}")]
    InvalidInput(String),

    /// The resolver tool exceeded its wall-clock deadline and was killed.
    #[error("Resolver [{tool}] timed out after {seconds}s")]
    ResolveTimeout {
        /// Name of the resolver binary.
        tool: String,
        /// The deadline that was exceeded, in whole seconds.
        seconds: u64,
    },

    /// The resolver tool could not be started or exited with an error.
    ///
    /// Stderr is captured and logged by the adapter; it is never carried
    /// here.
    #[error("Resolver [{tool}] failed")]
    ResolveFailed {
        /// Name of the resolver binary.
        tool: String,
    },

    /// The resolver tool ran successfully but produced no usable media URL.
    #[error("Resolution produced no usable media URL")]
    EmptyResolution,

    /// The resolver output matched neither supported output mode.
    #[error("Could not parse resolver output: {0}")]
    MalformedResolution(String),

    /// No audio-only candidate and no direct media URL to fall back to.
    #[error("No audio stream available for this source")]
    NoAudioStream,

    /// The upstream media host refused the connection or answered non-2xx.
    #[error("Upstream media host unreachable")]
    UpstreamUnreachable,

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::ResolveTimeout { .. } => 500,
            Error::ResolveFailed { .. } => 500,
            Error::EmptyResolution => 400,
            Error::MalformedResolution(_) => 400,
            Error::NoAudioStream => 404,
            Error::UpstreamUnreachable => 502,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for the structured error body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::ResolveTimeout { .. } => "resolve_timeout",
            Error::ResolveFailed { .. } => "resolve_failed",
            Error::EmptyResolution => "empty_resolution",
            Error::MalformedResolution(_) => "malformed_resolution",
            Error::NoAudioStream => "no_audio_stream",
            Error::UpstreamUnreachable => "upstream_unreachable",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = Error::InvalidInput("https://example.com/x".into());
        assert_eq!(err.to_string(), "Invalid source URL: https://example.com/x");
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn resolve_timeout_display() {
        let err = Error::ResolveTimeout {
            tool: "yt-dlp".into(),
            seconds: 30,
        };
        assert_eq!(err.to_string(), "Resolver [yt-dlp] timed out after 30s");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn resolve_failed_carries_no_diagnostics() {
        let err = Error::ResolveFailed {
            tool: "yt-dlp".into(),
        };
        // The client-facing message must stay generic.
        assert_eq!(err.to_string(), "Resolver [yt-dlp] failed");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn empty_resolution_maps_to_400() {
        assert_eq!(Error::EmptyResolution.http_status(), 400);
    }

    #[test]
    fn malformed_resolution_maps_to_400() {
        let err = Error::MalformedResolution("unexpected shape".into());
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code(), "malformed_resolution");
    }

    #[test]
    fn no_audio_stream_maps_to_404() {
        assert_eq!(Error::NoAudioStream.http_status(), 404);
    }

    #[test]
    fn upstream_unreachable_maps_to_502() {
        assert_eq!(Error::UpstreamUnreachable.http_status(), 502);
        assert_eq!(Error::UpstreamUnreachable.code(), "upstream_unreachable");
    }

    #[test]
    fn internal_maps_to_500() {
        assert_eq!(Error::Internal("boom".into()).http_status(), 500);
    }
}
