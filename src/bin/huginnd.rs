//! huginnd: Huginn classification daemon.
//!
//! Serves the classification [`Pipeline`](huginn::Pipeline) over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huginn::server::config::{BackendKind, Config, Secrets};
use huginn::{ClassifyProvider, HuginnError, LogStore, Pipeline};

/// Huginn daemon: document classification service.
#[derive(Parser)]
#[command(name = "huginnd")]
#[command(version)]
#[command(about = "Huginn document classification daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| HuginnError::Configuration(format!("Invalid address: {e}")))?;

    let backend = build_backend(&config, &secrets)?;

    let store = LogStore::open(&config.database.url).await?;
    store.initialize().await?;

    let pipeline = Pipeline::new(backend, store, config.classification.pipeline_config())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = pipeline.backend_name(),
        %addr,
        "huginnd starting"
    );

    let app = huginn::server::router(Arc::new(pipeline));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("huginnd stopped");
    Ok(())
}

/// Build the configured classification backend.
///
/// A missing API key is not fatal: the service starts and every
/// classification fails until a key is provided.
fn build_backend(
    config: &Config,
    secrets: &Secrets,
) -> Result<Arc<dyn ClassifyProvider>, HuginnError> {
    let classification = &config.classification;
    let api_key = classification
        .backend
        .secret_name()
        .and_then(|name| secrets.api_key(name));

    if let (Some(name), None) = (classification.backend.secret_name(), &api_key) {
        warn!(provider = name, "no API key configured; classification requests will fail");
    }

    match classification.backend {
        #[cfg(feature = "google")]
        BackendKind::Gemini => {
            let mut client = huginn::providers::GeminiClient::new(api_key);
            if let Some(ref model) = classification.model {
                client = client.model(model);
            }
            Ok(Arc::new(client))
        }

        #[cfg(feature = "huggingface")]
        BackendKind::HuggingFace => {
            let mut client = huginn::providers::HuggingFaceClient::new(api_key);
            if let Some(ref model) = classification.model {
                client = client.model(model);
            }
            Ok(Arc::new(client))
        }

        #[cfg(feature = "local-inference")]
        BackendKind::Local => {
            use huginn::providers::{Device, LocalNliModel, LocalZeroShotProvider, OnnxZeroShot};

            let local = config.local.clone().unwrap_or_default();
            let device = Device::parse(&local.device)?;
            let model = match classification.model {
                Some(ref name) => LocalNliModel::from_name(name)?,
                None => LocalNliModel::default(),
            };
            let onnx = OnnxZeroShot::load(&model, device, local.models_dir.as_deref())?;
            Ok(Arc::new(LocalZeroShotProvider::new(onnx)))
        }

        #[allow(unreachable_patterns)]
        other => Err(HuginnError::Configuration(format!(
            "backend {other:?} is not compiled into this build"
        ))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
