//! Heroes Mock API - CLI Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heroes_mock_api::{HttpMethod, HttpRequest, HttpResponse, MockApi, MockApiConfig, MockApiError};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "heroes-mock-api",
    about = "In-memory mock backend for the heroes API - request interception and response simulation",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mock-api.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a single request and print the response envelope
    Call {
        /// HTTP method (GET, POST, PATCH, DELETE, ...)
        method: String,

        /// Request url, optionally with a query string
        url: String,

        /// Query parameter as NAME=VALUE (repeatable)
        #[arg(short, long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Send JSON-lines requests from a file (or stdin) and print one envelope per line
    Replay {
        /// File with one `{"method", "url", "params", "body"}` object per line
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr so envelopes on stdout stay parseable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.print_config {
        let default_config = include_str!("../demos/mock-api.yaml");
        println!("{}", default_config);
        return Ok(());
    }

    // Load configuration
    let config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        MockApiConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using default configuration (built-in heroes, no stubs)");
        MockApiConfig::default()
    };

    if args.validate {
        config.validate()?;
        println!(
            "Configuration is valid ({} stubs defined)",
            config.stubs.len()
        );
        return Ok(());
    }

    let api = MockApi::from_config(config)?;

    match args.command {
        Some(Command::Call {
            method,
            url,
            params,
            body,
        }) => {
            let request = build_request(&method, &url, &params, body.as_deref())?;
            println!("{}", render(api.call(request).await)?);
        }
        Some(Command::Replay { file }) => replay(&api, file).await?,
        None => {
            info!(
                handlers = api.interceptor().service().len(),
                "No command given; use `call` or `replay` to send requests"
            );
        }
    }

    Ok(())
}

fn build_request(
    method: &str,
    url: &str,
    params: &[String],
    body: Option<&str>,
) -> Result<HttpRequest> {
    let method: HttpMethod = method.parse()?;
    let mut request = HttpRequest::new(method, url);

    for param in params {
        let (name, value) = param
            .split_once('=')
            .with_context(|| format!("Invalid parameter '{}', expected NAME=VALUE", param))?;
        request = request.with_param(name, value);
    }

    if let Some(body) = body {
        let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
        request = request.with_body(body);
    }

    Ok(request)
}

async fn replay(api: &MockApi, file: Option<PathBuf>) -> Result<()> {
    let reader: Box<dyn tokio::io::AsyncBufRead + Unpin> = match file {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let request: HttpRequest = serde_json::from_str(&line)
            .with_context(|| format!("Line {}: invalid request", line_no))?;
        let request = request.split_query();

        println!("{}", serde_json::to_string(&envelope(api.call(request).await))?);
    }

    Ok(())
}

/// JSON form of a pipeline result.
fn envelope(result: Result<HttpResponse, MockApiError>) -> Value {
    match result {
        Ok(response) => serde_json::to_value(response).unwrap_or_default(),
        Err(MockApiError::Http(error)) => serde_json::to_value(error).unwrap_or_default(),
        Err(other) => serde_json::json!({ "status": 0, "statusText": "ERROR", "error": other.to_string() }),
    }
}

fn render(result: Result<HttpResponse, MockApiError>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&envelope(result))?)
}
