mod cli;

use audiorelay::{
    config::{Config, DEFAULT_PORT},
    resolver::{self, ResolveRequest, Resolver, YtdlpResolver},
    server,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audiorelay=trace,tower_http=debug".to_string()
        } else {
            "audiorelay=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    let mut config = Config::default();
    config.resolver.program = cli.resolver.clone();

    match cli.command {
        Commands::Serve { host, port } => {
            config.server.host = host;
            config.server.port = port.or_else(port_from_env).unwrap_or(DEFAULT_PORT);

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(config))
        }
        Commands::Resolve {
            url,
            json,
            url_only,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve_once(config, url, json, url_only))
        }
        Commands::CheckTools => check_tools(&config),
        Commands::Version => {
            println!("audiorelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Optional listen-port override from the environment.
fn port_from_env() -> Option<u16> {
    std::env::var("AUDIORELAY_PORT").ok().and_then(|v| v.parse().ok())
}

async fn serve(config: Config) -> Result<()> {
    let resolver = YtdlpResolver::discover(&config.resolver, &config.relay.user_agent)?;
    tracing::info!("Using resolver at {}", resolver.program().display());

    let ctx = server::AppContext::new(config, Arc::new(resolver))?;
    server::start_server(ctx).await
}

async fn resolve_once(config: Config, url: String, json: bool, url_only: bool) -> Result<()> {
    let resolver = YtdlpResolver::discover(&config.resolver, &config.relay.user_agent)?;

    let request = ResolveRequest {
        source_url: url,
        want_metadata: !url_only,
    };
    let resolution = resolver.resolve(&request).await?;

    if url_only {
        match resolver::select_audio_url(&resolution) {
            Some(audio_url) => println!("{audio_url}"),
            None => anyhow::bail!("no audio stream available"),
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("Title: {}", resolution.title);
    if let Some(duration) = resolution.duration_secs {
        let secs = duration.round() as u64;
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }
    if let Some(ref uploader) = resolution.uploader {
        println!("Uploader: {uploader}");
    }
    if let Some(ref thumbnail) = resolution.thumbnail {
        println!("Thumbnail: {thumbnail}");
    }
    println!("Candidate streams: {}", resolution.formats.len());
    match resolver::select_audio_url(&resolution) {
        Some(audio_url) => println!("Audio URL: {audio_url}"),
        None => println!("Audio URL: (none available)"),
    }

    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let path = config
        .resolver
        .program
        .clone()
        .filter(|p| p.exists())
        .or_else(|| which::which(resolver::DEFAULT_PROGRAM).ok());

    match path {
        Some(path) => {
            print!("✓ {}", resolver::DEFAULT_PROGRAM);
            if let Some(version) = detect_version(&path) {
                print!(" ({version})");
            }
            println!(" - {}", path.display());
        }
        None => {
            println!("✗ {} not found in PATH", resolver::DEFAULT_PROGRAM);
            println!("\nInstall it to enable resolution.");
        }
    }

    Ok(())
}

/// Run `<tool> --version` and return the first line of stdout.
fn detect_version(path: &std::path::Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("--version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
