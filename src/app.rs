//! Application wiring: builds the Gemini clients and pipelines from config and
//! serves them over HTTP.

use crate::ai::{GeminiVisionClient, VisionService};
use crate::models::{Config, ResponseMode};
use crate::pipeline::{IdentificationPipeline, PipelineProfile};
use crate::server::{self, AppState};
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Owns the shared state behind every endpoint.
pub struct App {
    state: Arc<AppState>,
    max_upload_bytes: Option<usize>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub identify: Arc<dyn VisionService>,
    pub candidates: Arc<dyn VisionService>,
    pub redirect: Arc<dyn VisionService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, max_upload_bytes: Option<usize>) -> Self {
        let pipeline = |vision: Arc<dyn VisionService>, mode: ResponseMode| {
            IdentificationPipeline::new(vision, PipelineProfile::for_mode(mode))
        };

        Self {
            state: Arc::new(AppState {
                identify: pipeline(services.identify, ResponseMode::Identify),
                candidates: pipeline(services.candidates, ResponseMode::Candidates),
                redirect: pipeline(services.redirect, ResponseMode::Redirect),
            }),
            max_upload_bytes,
        }
    }

    /// Construct an app talking to Gemini as described by `config`.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across the per-mode clients.
        let http_client = reqwest::Client::new();

        let client_for = |mode: ResponseMode| -> Arc<dyn VisionService> {
            let model = config.model_for(mode);
            info!("{} endpoint: Gemini (model: {})", mode, model);
            Arc::new(
                GeminiVisionClient::new_with_client(
                    config.gemini_api_key.clone(),
                    model.to_string(),
                    http_client.clone(),
                )
                .with_base_url(config.gemini_base_url.clone())
                .with_timeout(config.gemini_timeout),
            )
        };

        Self::with_services(
            AppServices {
                identify: client_for(ResponseMode::Identify),
                candidates: client_for(ResponseMode::Candidates),
                redirect: client_for(ResponseMode::Redirect),
            },
            config.max_upload_bytes,
        )
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config))
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone(), self.max_upload_bytes)
    }

    /// Serve on an already-bound listener until the server stops.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }
}
