//! Application configuration.
//!
//! There is deliberately no configuration file. Everything is a compiled-in
//! default overridden by CLI flags, plus the single `AUDIORELAY_PORT`
//! environment variable handled by the binary.

use std::path::PathBuf;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Spoofed browser identity sent to both the resolver tool and the upstream
/// media host. Some hosts reject clients that do not look like a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Root application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub resolver: ResolverConfig,
    pub relay: RelayConfig,
}

/// Listen address settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Settings for the external resolver tool.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Explicit path to the resolver binary; `None` means look it up on PATH.
    pub program: Option<PathBuf>,
    /// Wall-clock deadline for one resolver invocation. The process is
    /// killed when the deadline passes.
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Settings for the upstream media fetch.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Connection timeout for the upstream media host.
    pub connect_timeout: Duration,
    /// Client identity presented to the upstream host.
    pub user_agent: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            user_agent: USER_AGENT.to_string(),
        }
    }
}
