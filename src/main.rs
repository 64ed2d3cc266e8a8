//! CLI entry point for request_hook.
//!
//! Issues a single GET or multipart POST through a [`Requester`] and prints
//! the decoded payload.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use request_hook::{AppSettings, ClientConfig, ClientProvider, Requester, SettingsStore};
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "request_hook")]
#[command(about = "Issue GET/POST requests with a loading/data wrapper", long_about = None)]
struct Cli {
    /// Server base address, overrides API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (0 = none), overrides API_TIMEOUT_MS
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// JSON settings file, read before the --base-url override
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a path with optional query parameters
    Get {
        /// Path relative to the base address, or an absolute URL
        path: String,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// POST multipart form fields to a path
    Post {
        /// Path relative to the base address, or an absolute URL
        path: String,

        /// Form field as KEY=VALUE (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/request_hook.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("request_hook.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    let mut settings = match &cli.settings {
        Some(path) => AppSettings::load(path)?,
        None => AppSettings::from_env(),
    };
    if let Some(base_url) = cli.base_url {
        settings = AppSettings::new(base_url);
    }

    let provider = Arc::new(ClientProvider::new(config)?);
    debug!(
        ?settings,
        timeout_ms = provider.config().timeout.as_millis() as u64,
        "Configuration loaded"
    );
    let requester = Requester::new(provider, Arc::new(SettingsStore::new(settings)));

    let payload = match cli.command {
        Commands::Get { path, params } => {
            let params = parse_pairs(&params)?;
            requester.try_get(&path, &params).await?
        }
        Commands::Post { path, fields } => {
            let body = parse_pairs(&fields)?;
            requester.try_post(&path, &body).await?
        }
    };

    info!(loading = requester.is_loading(), "Request settled");
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

/// Parses `KEY=VALUE` arguments into a JSON object of string values.
fn parse_pairs(raw: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got '{pair}'"))?;
        if key.is_empty() {
            bail!("empty key in '{pair}'");
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}
