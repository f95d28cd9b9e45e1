use crate::routes::{router, AppState};

use clap::Parser;
use rentbot_core::artifacts::{ArtifactError, ArtifactPaths, DEFAULT_MAPPINGS_FILE, DEFAULT_MODEL_FILE};
use rentbot_core::averages::load_averages;
use rentbot_core::predictor::PredictionContext;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "rentbot-server", about = "Rent estimate API and web form", version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:5000")]
    pub bind: String,

    /// Model file
    #[arg(long = "model", value_name = "PATH", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Category mappings file
    #[arg(long = "mappings", value_name = "PATH", default_value = DEFAULT_MAPPINGS_FILE)]
    pub mappings: PathBuf,

    /// Listing CSV for the district averages chart
    #[arg(long = "data", value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Refuse to start without a loadable model
    #[arg(long = "require-model")]
    pub require_model: bool,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            paths: ArtifactPaths { model: self.model, mappings: self.mappings },
            data: self.data,
            require_model: self.require_model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub paths: ArtifactPaths,
    pub data: Option<PathBuf>,
    pub require_model: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("model required but not loaded: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

impl ServerConfig {
    /// Load artifacts and averages once; the result is never mutated.
    pub fn load_state(&self) -> Result<AppState, ServerError> {
        let ctx = if self.require_model {
            PredictionContext::load(&self.paths)?
        } else {
            PredictionContext::load_or_fallback(&self.paths)
        };
        let averages = load_averages(self.data.as_deref());
        Ok(AppState { ctx, averages })
    }

    pub fn run(&self) -> Result<(), ServerError> {
        let state = Arc::new(self.load_state()?);
        tracing::info!("Serving in {} mode", state.ctx.source());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ServerError::Runtime)?;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(&self.bind)
                .await
                .map_err(|source| ServerError::Bind { addr: self.bind.clone(), source })?;
            tracing::info!("Listening on http://{}", self.bind);

            axum::serve(listener, router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(ServerError::Serve)?;

            tracing::info!("Server stopped");
            Ok::<(), ServerError>(())
        })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
