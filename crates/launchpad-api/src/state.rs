//! Application state wiring the generation provider, the hosting client and
//! the turn orchestrator together.
//!
//! Used by both CLI commands and HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use launchpad_core::deploy::DeploymentPipeline;
use launchpad_core::llm::box_provider::BoxLlmProvider;
use launchpad_core::turn::{GenerationEngine, TurnOrchestrator};
use launchpad_infra::config::load_config;
use launchpad_infra::credentials::{EnvCredentials, LLM_KEY_VARS};
use launchpad_infra::deploy::VercelClient;
use launchpad_infra::filesystem::resolve_data_dir;
use launchpad_infra::llm::create_provider;
use launchpad_types::config::LaunchpadConfig;

pub type ConcretePipeline = DeploymentPipeline<VercelClient>;

pub type ConcreteOrchestrator = TurnOrchestrator<VercelClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LaunchpadConfig>,
    pub data_dir: PathBuf,
    pub hosting: Arc<VercelClient>,
    pub pipeline: Arc<ConcretePipeline>,
    orchestrator: Result<Arc<ConcreteOrchestrator>, Arc<str>>,
}

impl AppState {
    /// Load config and credentials from the environment and wire services.
    ///
    /// A missing generation key is not fatal here: deploy and status work
    /// without it, and chat reports the reason when used.
    pub async fn init(auto_deploy: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        let credentials = EnvCredentials::new();

        let hosting = VercelClient::new(&config.deploy, credentials.hosting_token())?;

        let provider = match credentials.llm_api_key() {
            None => Err(format!("{} is not configured", LLM_KEY_VARS[1])),
            Some(key) => create_provider(&config.llm, Some(key)).map_err(|e| e.to_string()),
        };

        tracing::debug!(
            data_dir = %data_dir.display(),
            provider = %config.llm.provider,
            template = %config.deploy.template,
            "application state initialized"
        );
        Ok(Self::new(config, data_dir, provider, hosting, auto_deploy))
    }

    pub fn new(
        config: LaunchpadConfig,
        data_dir: PathBuf,
        provider: Result<BoxLlmProvider, String>,
        hosting: VercelClient,
        auto_deploy: bool,
    ) -> Self {
        let hosting = Arc::new(hosting);
        let pipeline = Arc::new(DeploymentPipeline::from_settings(hosting.clone(), &config.deploy));

        let orchestrator = provider
            .map(|provider| {
                let engine =
                    GenerationEngine::new(provider, config.llm.clone(), config.deploy.template);
                Arc::new(TurnOrchestrator::new(engine, pipeline.clone()).with_auto_deploy(auto_deploy))
            })
            .map_err(Arc::from);

        Self {
            config: Arc::new(config),
            data_dir,
            hosting,
            pipeline,
            orchestrator,
        }
    }

    /// The turn orchestrator, or why no generation provider is available.
    pub fn orchestrator(&self) -> Result<Arc<ConcreteOrchestrator>, String> {
        self.orchestrator
            .clone()
            .map_err(|reason| format!("generation provider unavailable: {reason}"))
    }

    pub fn chat_unavailable(&self) -> Option<&str> {
        self.orchestrator.as_ref().err().map(|reason| &**reason)
    }
}
