use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use usdb_acquire::UsdbConfig;
use usdb_model::{InvocationEvent, SearchQuery};

#[derive(Parser)]
#[command(name = "usdb")]
#[command(about = "Search usdb.eu and fetch karaoke lyric files")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, search, and print up to three lyric files as JSON
    Search {
        /// Search text (artist, title, or both)
        #[arg(short, long)]
        query: String,
    },

    /// Run the request handler on a single invocation event
    Invoke {
        /// Path to the event JSON ({"httpMethod": ..., "body": ...}); reads stdin if omitted
        #[arg(short, long)]
        event: Option<String>,
    },

    /// Serve the search endpoint over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    // Logs go to stderr so stdout carries only JSON output
    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let config = UsdbConfig::from_env()?;

    match cli.command {
        Commands::Search { query } => {
            let query = SearchQuery::parse(&query)?;
            tracing::info!(query = %query, base = %config.base_url, "Searching USDB");
            let songs = usdb_acquire::fetch_songs(&config, &query).await?;
            println!("{}", serde_json::to_string_pretty(&songs)?);
        }
        Commands::Invoke { event } => {
            let raw = match &event {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read event file {path}"))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read event from stdin")?;
                    buf
                }
            };
            let event: InvocationEvent = serde_json::from_str(&raw).context("Event is not valid JSON")?;
            let response = usdb_api::handle(&event, &config).await;
            tracing::info!(status = response.status_code, "Invocation finished");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Serve { host, port } => {
            let addr = format!("{host}:{port}");
            usdb_api::serve(config, &addr).await?;
        }
    }

    Ok(())
}
