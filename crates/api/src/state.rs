use std::sync::Arc;

use analyser_core::artifact::ArtifactStore;
use analyser_core::engine::AnalysisEngine;
use analyser_core::ticker::TickerValidator;
use analyser_engine::{CommandEngine, FinnhubValidator, FsArtifactStore, SimulatedEngine};

use crate::config::{EngineConfig, ServerConfig};
use crate::job::JobContext;
use crate::ws::{ActionDispatcher, ConnectionSupervisor, SessionRegistry};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Runs one analysis job per WebSocket connection.
    pub supervisor: Arc<ConnectionSupervisor>,
    /// Live analysis sessions (shared with the supervisor).
    pub registry: Arc<SessionRegistry>,
    /// Ticker lookup. `None` means format-only validation.
    pub validator: Option<Arc<dyn TickerValidator>>,
}

impl AppState {
    /// Wire the state from explicit collaborators.
    pub fn new(
        config: ServerConfig,
        jobs: JobContext,
        validator: Option<Arc<dyn TickerValidator>>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let supervisor = Arc::new(ConnectionSupervisor::new(
            jobs,
            Arc::new(ActionDispatcher::default()),
            Arc::clone(&registry),
        ));

        Self {
            config: Arc::new(config),
            supervisor,
            registry,
            validator,
        }
    }

    /// Build the production collaborators described by `config`.
    pub fn from_config(config: ServerConfig) -> Self {
        let engine: Arc<dyn AnalysisEngine> = match &config.engine {
            EngineConfig::Command { program, args } => {
                tracing::info!(program = %program, "Using external analysis engine");
                Arc::new(CommandEngine::new(
                    program.clone(),
                    args.clone(),
                    config.output_dir.clone(),
                ))
            }
            EngineConfig::Simulated { delay } => {
                tracing::warn!(
                    delay_ms = delay.as_millis() as u64,
                    "ENGINE_COMMAND not set, using simulated analysis engine",
                );
                Arc::new(SimulatedEngine::new(config.output_dir.clone(), *delay))
            }
        };
        let artifacts: Arc<dyn ArtifactStore> =
            Arc::new(FsArtifactStore::new(config.output_dir.clone()));

        let validator: Option<Arc<dyn TickerValidator>> = match &config.finnhub {
            Some(finnhub) => Some(Arc::new(FinnhubValidator::new(
                finnhub.base_url.clone(),
                finnhub.api_key.clone(),
            ))),
            None => {
                tracing::warn!("FINNHUB_API_KEY not set, ticker validation is format-only");
                None
            }
        };

        Self::new(config, JobContext { engine, artifacts }, validator)
    }
}
