//! SQL injection detection API entry point.

use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqli_detector::api::{create_router, AppState, DetectResponse};
use sqli_detector::config::Config;
use sqli_detector::detector::Detector;
use sqli_detector::error::DetectorError;
use sqli_detector::metrics;
use sqli_detector::model::ArtifactPaths;
use sqli_detector::utils::shutdown_signal;

/// SQL injection detection API.
#[derive(Parser, Debug)]
#[command(name = "sqli-detector")]
#[command(about = "Classifies SQL queries as malicious or benign using a pre-trained model")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Address to bind (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the artifacts and serve the HTTP API (default).
    Serve {
        /// Address to bind (overrides HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and validate both artifacts, then exit.
    CheckArtifacts,

    /// Classify a single query and print the result as JSON.
    Classify {
        /// Query text.
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("sqli_detector=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve { host, port }) => cmd_serve(host, port).await,
        Some(Command::CheckArtifacts) => cmd_check_artifacts(),
        Some(Command::Classify { query }) => cmd_classify(&query),
        None => cmd_serve(args.host, args.port).await,
    }
}

/// Load and validate configuration, applying CLI overrides.
fn load_config(host: Option<String>, port: Option<u16>) -> sqli_detector::Result<Config> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        DetectorError::InvalidConfig(e)
    })?;

    Ok(config)
}

/// Load both artifacts; any failure is fatal.
fn load_detector(config: &Config) -> sqli_detector::Result<Detector> {
    let paths = ArtifactPaths::from(config);
    let detector = Detector::load(&paths).map_err(|e| {
        error!("Failed to load artifacts: {}", e);
        e
    })?;
    Ok(detector)
}

/// Serve the HTTP API until a shutdown signal arrives.
async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(host, port)?;

    info!(
        model = %config.model_path.display(),
        vectorizer = %config.vectorizer_path.display(),
        "Loading model and vectorizer..."
    );
    let detector = load_detector(&config)?;
    info!("Vectorizer: {}", detector.vectorizer_info());
    info!("Classifier: {}", detector.classifier_info());

    let metrics_handle = metrics::install_recorder()
        .map_err(|e| anyhow!("Failed to install metrics recorder: {}", e))?;

    let state = AppState::new(Arc::new(detector), metrics_handle)
        .with_max_query_chars(config.query_limit())
        .with_request_timeout(config.request_timeout());

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", config.bind_address(), e))?;
    info!("Starting API server on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Check that both artifacts load and agree with each other.
fn cmd_check_artifacts() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SQL INJECTION DETECTOR - ARTIFACT CHECK");
    println!("======================================================================");

    let config = load_config(None, None)?;
    println!("  Model:      {}", config.model_path.display());
    println!("  Vectorizer: {}", config.vectorizer_path.display());

    print!("Loading artifacts... ");
    let detector = match Detector::load(&ArtifactPaths::from(&config)) {
        Ok(d) => {
            println!("OK");
            d
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow!("Artifact check failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("  Vectorizer: {}", detector.vectorizer_info());
    println!("  Classifier: {}", detector.classifier_info());
    println!("  Features:   {}", detector.n_features());
    println!("======================================================================");
    println!("ARTIFACT CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Classify one query from the command line.
fn cmd_classify(query: &str) -> anyhow::Result<()> {
    let config = load_config(None, None)?;
    if let Some(max) = config.query_limit() {
        let len = query.chars().count();
        if len > max {
            return Err(anyhow!("Query is {} characters long, the limit is {}", len, max));
        }
    }

    let response = classify_once(&config, query)?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

fn classify_once(config: &Config, query: &str) -> sqli_detector::Result<DetectResponse> {
    let detector = load_detector(config)?;
    let detection = detector.classify(query)?;
    Ok(DetectResponse::from(detection))
}
