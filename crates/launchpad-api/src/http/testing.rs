//! Shared fixtures for handler tests: a scripted generation provider, an
//! in-process stand-in for the Vercel API, and a helper that serves the app.

use std::pin::Pin;

use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::Stream;
use secrecy::SecretString;
use serde_json::{Value, json};

use launchpad_core::llm::box_provider::BoxLlmProvider;
use launchpad_core::llm::provider::LlmProvider;
use launchpad_infra::deploy::VercelClient;
use launchpad_types::config::LaunchpadConfig;
use launchpad_types::deploy::ProjectTemplate;
use launchpad_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

use crate::state::AppState;

pub const SCENARIO_A: [&str; 3] = [
    "Sure! ",
    "```DEPLOY_CONFIG\n{\"shouldDeploy\": true, \"projectName\": \"bean\", \"code\": \"<h1>",
    "Hi</h1>\"}\n```",
];

pub struct ScriptedProvider {
    fragments: Vec<String>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 8_192,
                max_output_tokens: 1_024,
            },
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            id: "resp_1".to_string(),
            content: self.fragments.concat(),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 12,
                output_tokens: 34,
            },
        })
    }

    fn stream(
        &self,
        _request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let mut events: Vec<Result<StreamEvent, LlmError>> = vec![Ok(StreamEvent::Connected)];
        events.extend(
            self.fragments
                .iter()
                .map(|text| Ok(StreamEvent::TextDelta { text: text.clone() })),
        );
        events.push(Ok(StreamEvent::Done));
        Box::pin(futures_util::stream::iter(events))
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A Vercel stand-in whose deployments are READY on the first read.
pub async fn fake_vercel() -> String {
    async fn create(Json(body): Json<Value>) -> Json<Value> {
        let name = body["name"].as_str().unwrap_or("app");
        Json(json!({ "id": "dpl_7", "url": format!("{name}-7.vercel.app") }))
    }

    async fn status(Path(id): Path<String>) -> Json<Value> {
        Json(json!({ "id": id, "readyState": "READY" }))
    }

    serve(
        Router::new()
            .route("/v13/deployments", post(create))
            .route("/v13/deployments/{id}", get(status)),
    )
    .await
}

/// Build app state around a scripted provider and the given Vercel base URL.
pub fn state(fragments: Option<&[&str]>, vercel_base: &str, with_token: bool) -> AppState {
    let mut config = LaunchpadConfig::default();
    config.deploy.base_url = vercel_base.to_string();
    config.deploy.template = ProjectTemplate::Static;
    config.deploy.poll_interval_ms = 5;
    config.deploy.max_poll_attempts = 3;

    let token = with_token.then(|| SecretString::from("vc-test".to_string()));
    let hosting = VercelClient::new(&config.deploy, token).unwrap();
    let provider = match fragments {
        Some(fragments) => Ok(BoxLlmProvider::new(ScriptedProvider::new(fragments))),
        None => Err("OPENAI_API_KEY is not configured".to_string()),
    };

    AppState::new(config, std::env::temp_dir(), provider, hosting, true)
}

/// Serve the full app router for `state`.
pub async fn spawn_app(state: AppState) -> String {
    serve(crate::http::router::build_router(state)).await
}
