use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "audiorelay")]
#[command(author, version, about = "Resolve-and-relay audio streaming server")]
pub struct Cli {
    /// Path to the resolver binary (defaults to yt-dlp on PATH)
    #[arg(long, global = true)]
    pub resolver: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP streaming server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on (falls back to AUDIORELAY_PORT, then 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a single source URL and print the normalized metadata
    Resolve {
        /// Source page URL
        #[arg(required = true)]
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Print only the selected audio URL
        #[arg(long)]
        url_only: bool,
    },

    /// Check that the external resolver tool is available
    CheckTools,

    /// Display version information
    Version,
}
