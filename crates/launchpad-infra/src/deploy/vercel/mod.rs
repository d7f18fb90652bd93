//! Vercel hosting client.
//!
//! Submits an inline file set to `POST /v13/deployments` and reads
//! `readyState` from `GET /v13/deployments/{id}`.

pub mod types;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};

use launchpad_core::deploy::HostingProvider;
use launchpad_types::config::DeploySettings;
use launchpad_types::deploy::{DeployError, DeploymentRecord, DeploymentRequest, ReadyState};

use self::types::{CreateDeploymentBody, DeploymentResponse, ErrorEnvelope, InlineFile};

pub const TOKEN_ENV: &str = "VERCEL_TOKEN";

const GENERIC_FAILURE: &str = "Deployment failed";

/// HTTP client for the Vercel deployments API.
///
/// Does NOT derive Debug: it holds the access token.
pub struct VercelClient {
    client: reqwest::Client,
    token: Option<SecretString>,
    base_url: String,
    team_id: Option<String>,
}

impl VercelClient {
    /// Build a client. A missing token is accepted here and reported by the
    /// first call, before any network traffic.
    pub fn new(settings: &DeploySettings, token: Option<SecretString>) -> Result<Self, DeployError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            token,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            team_id: settings.team_id.clone(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, DeployError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| DeployError::MissingCredential(TOKEN_ENV.to_string()))?;
        let builder = builder.bearer_auth(token.expose_secret());
        Ok(match &self.team_id {
            Some(team) => builder.query(&[("teamId", team)]),
            None => builder,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v13/deployments{path}", self.base_url)
    }

    /// Fetch the raw deployment document.
    pub async fn get_deployment(&self, id: &str) -> Result<DeploymentResponse, DeployError> {
        let url = self.url(&format!("/{id}"));
        let response = self
            .authorized(self.client.get(&url))?
            .send()
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<DeploymentResponse>()
            .await
            .map_err(|e| DeployError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// Turn a non-2xx response into [`DeployError::Provider`], preferring the
/// provider's own `error.message`.
async fn check_status(response: Response) -> Result<Response, DeployError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
    let error = envelope.and_then(|e| e.error);
    let code = error.as_ref().and_then(|e| e.code.clone());
    let message = error
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    tracing::warn!(
        status = %status,
        code = code.as_deref().unwrap_or(""),
        message = %message,
        "Vercel API error response"
    );
    Err(DeployError::Provider {
        status: status.as_u16(),
        message,
    })
}

impl HostingProvider for VercelClient {
    fn name(&self) -> &str {
        "vercel"
    }

    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentRecord, DeployError> {
        let files = request
            .files
            .iter()
            .map(|f| InlineFile {
                file: &f.path,
                data: BASE64.encode(f.content.as_bytes()),
                encoding: "base64",
            })
            .collect();
        let body = CreateDeploymentBody {
            name: &request.name,
            files,
            target: &request.target,
            project_settings: &request.settings,
        };

        let url = self.url("");
        tracing::debug!(url = %url, name = %request.name, files = request.files.len(), "Vercel create request");

        let response = self
            .authorized(self.client.post(&url))?
            .json(&body)
            .send()
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        let created: DeploymentResponse = response
            .json()
            .await
            .map_err(|e| DeployError::Deserialization(format!("failed to parse response: {e}")))?;

        let host = created
            .url
            .ok_or_else(|| DeployError::Deserialization("deployment response has no url".into()))?;
        Ok(DeploymentRecord::queued(created.id, format!("https://{host}")))
    }

    async fn ready_state(&self, id: &str) -> Result<ReadyState, DeployError> {
        let deployment = self.get_deployment(id).await?;
        Ok(deployment
            .ready_state
            .unwrap_or_else(|| ReadyState::Other("UNKNOWN".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use launchpad_types::deploy::{ProjectFileSet, TemplateSettings, ProjectTemplate};

    use super::*;

    #[derive(Clone, Default)]
    struct Seen {
        bodies: Arc<Mutex<Vec<Value>>>,
        auth: Arc<Mutex<Vec<String>>>,
        teams: Arc<Mutex<Vec<Option<String>>>>,
    }

    async fn create(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Query(query): Query<std::collections::HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.auth.lock().unwrap().push(auth);
        seen.teams.lock().unwrap().push(query.get("teamId").cloned());
        let name = body["name"].as_str().unwrap_or_default().to_string();
        seen.bodies.lock().unwrap().push(body);

        match name.as_str() {
            "quota" => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({"error": {"code": "quota", "message": "Deployment quota exceeded"}})),
            ),
            "opaque" => (StatusCode::BAD_REQUEST, Json(json!({"oops": true}))),
            _ => (
                StatusCode::OK,
                Json(json!({"id": "dpl_42", "url": "bean-42.vercel.app", "readyState": "QUEUED"})),
            ),
        }
    }

    async fn status(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
        match id.as_str() {
            "dpl_42" => (StatusCode::OK, Json(json!({"id": id, "readyState": "BUILDING"}))),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": "not_found", "message": "Deployment not found"}})),
            ),
        }
    }

    async fn serve() -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/v13/deployments", post(create))
            .route("/v13/deployments/{id}", get(status))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn settings(base_url: &str, team_id: Option<&str>) -> DeploySettings {
        DeploySettings {
            base_url: base_url.to_string(),
            team_id: team_id.map(String::from),
            ..Default::default()
        }
    }

    fn token() -> Option<SecretString> {
        Some(SecretString::from("vc-test-token".to_string()))
    }

    fn request(name: &str) -> DeploymentRequest {
        let mut files = ProjectFileSet::new();
        files.insert("index.html", "<h1>Hi</h1>");
        DeploymentRequest {
            name: name.to_string(),
            target: "production".to_string(),
            files,
            settings: TemplateSettings::for_template(ProjectTemplate::Static),
        }
    }

    #[tokio::test]
    async fn test_create_deployment_sends_inline_files() {
        let (base, seen) = serve().await;
        let client = VercelClient::new(&settings(&base, None), token()).unwrap();

        let record = client.create_deployment(&request("bean")).await.unwrap();
        assert_eq!(record.id, "dpl_42");
        assert_eq!(record.url, "https://bean-42.vercel.app");
        assert_eq!(record.ready_state, ReadyState::Queued);

        let bodies = seen.bodies.lock().unwrap();
        let body = &bodies[0];
        assert_eq!(body["target"], "production");
        assert_eq!(body["files"][0]["file"], "index.html");
        assert_eq!(body["files"][0]["encoding"], "base64");
        let decoded = BASE64
            .decode(body["files"][0]["data"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"<h1>Hi</h1>");
        assert!(body["projectSettings"]["framework"].is_null());
        assert_eq!(seen.auth.lock().unwrap()[0], "Bearer vc-test-token");
        assert_eq!(seen.teams.lock().unwrap()[0], None);
    }

    #[tokio::test]
    async fn test_team_id_is_sent_as_query() {
        let (base, seen) = serve().await;
        let client = VercelClient::new(&settings(&base, Some("team_7")), token()).unwrap();
        client.create_deployment(&request("bean")).await.unwrap();
        assert_eq!(seen.teams.lock().unwrap()[0].as_deref(), Some("team_7"));
    }

    #[tokio::test]
    async fn test_provider_message_is_surfaced() {
        let (base, _) = serve().await;
        let client = VercelClient::new(&settings(&base, None), token()).unwrap();
        let err = client.create_deployment(&request("quota")).await.unwrap_err();
        match err {
            DeployError::Provider { status, message } => {
                assert_eq!(status, 402);
                assert_eq!(message, "Deployment quota exceeded");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_error_message_falls_back() {
        let (base, _) = serve().await;
        let client = VercelClient::new(&settings(&base, None), token()).unwrap();
        let err = client.create_deployment(&request("opaque")).await.unwrap_err();
        assert_eq!(err.to_string(), "Deployment failed");
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let (base, seen) = serve().await;
        let client = VercelClient::new(&settings(&base, None), None).unwrap();
        let err = client.create_deployment(&request("bean")).await.unwrap_err();
        assert!(matches!(err, DeployError::MissingCredential(ref v) if v == "VERCEL_TOKEN"));
        assert!(err.is_configuration());
        assert!(seen.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ready_state_reads_status() {
        let (base, _) = serve().await;
        let client = VercelClient::new(&settings(&base, None), token()).unwrap();
        assert_eq!(client.ready_state("dpl_42").await.unwrap(), ReadyState::Building);

        let err = client.ready_state("dpl_missing").await.unwrap_err();
        assert!(matches!(err, DeployError::Provider { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Bind and drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = VercelClient::new(&settings(&format!("http://{addr}"), None), token()).unwrap();
        let err = client.ready_state("dpl_42").await.unwrap_err();
        assert!(matches!(err, DeployError::Transport(_)));
    }
}
