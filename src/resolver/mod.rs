//! Source URL resolution via the external resolver tool.
//!
//! The [`Resolver`] trait is the seam between request handlers and the
//! yt-dlp subprocess: handlers depend on the trait, tests inject doubles.
//! [`YtdlpResolver`] is the production implementation.

pub mod command;
pub mod output;
pub mod select;

pub use output::{CandidateFormat, Resolution, DEFAULT_TITLE};
pub use select::select_audio_url;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use command::ToolCommand;

/// Default resolver binary looked up on PATH.
pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// One resolution request as issued by a request handler.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub source_url: String,
    /// When false the tool is asked for the bare URL only (line output),
    /// skipping the metadata document.
    pub want_metadata: bool,
}

/// Accepted source-platform check, run before any subprocess is spawned.
pub fn accepts_source_url(url: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/.+$")
            .expect("source URL pattern is valid")
    });
    re.is_match(url)
}

/// Capability of turning a source page URL into a normalized [`Resolution`].
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution>;
}

/// Production resolver backed by the yt-dlp command-line tool.
pub struct YtdlpResolver {
    program: PathBuf,
    timeout: Duration,
    user_agent: String,
}

impl YtdlpResolver {
    pub fn new(
        program: impl Into<PathBuf>,
        timeout: Duration,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            timeout,
            user_agent: user_agent.into(),
        }
    }

    /// Locate the resolver binary: configured override first, then PATH.
    pub fn discover(config: &ResolverConfig, user_agent: &str) -> Result<Self> {
        let program = match &config.program {
            Some(path) if path.exists() => path.clone(),
            Some(path) => {
                tracing::warn!(
                    "configured resolver {} does not exist; falling back to PATH",
                    path.display()
                );
                locate_default()?
            }
            None => locate_default()?,
        };
        Ok(Self::new(program, config.timeout, user_agent))
    }

    /// Resolved path of the resolver binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn build_command(&self, request: &ResolveRequest) -> ToolCommand {
        let cmd = ToolCommand::new(self.program.clone())
            .timeout(self.timeout)
            .args(["-f", "bestaudio/best", "--no-playlist", "--no-warnings"])
            .arg("--user-agent")
            .arg(self.user_agent.as_str())
            .args(["--socket-timeout", "15"]);

        let cmd = if request.want_metadata {
            // Single combined invocation: one JSON document carries both the
            // metadata and the stream candidates.
            cmd.arg("-J")
        } else {
            cmd.arg("--get-url")
        };

        cmd.arg(request.source_url.as_str())
    }
}

fn locate_default() -> Result<PathBuf> {
    which::which(DEFAULT_PROGRAM).map_err(|_| {
        Error::Internal(format!(
            "{DEFAULT_PROGRAM} not found; is it installed and in PATH?"
        ))
    })
}

#[async_trait]
impl Resolver for YtdlpResolver {
    async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution> {
        if !accepts_source_url(&request.source_url) {
            return Err(Error::InvalidInput(request.source_url.clone()));
        }

        tracing::debug!(source = %request.source_url, "resolving source URL");
        let output = self.build_command(request).execute().await?;

        if !output.status.success() {
            // Stderr stays in the logs; the client sees a generic failure.
            let tool = self
                .program
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
            tracing::error!(
                tool = %tool,
                status = %output.status,
                stderr = %output.stderr.trim(),
                "resolver exited with an error"
            );
            return Err(Error::ResolveFailed { tool });
        }

        output::parse(&output.stdout)
    }
}
