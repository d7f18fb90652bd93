//! Deployment endpoints.
//!
//! - `POST /api/deploy` submits a directive and polls it to an outcome:
//!   `{ success: true, url, deploymentId, note? }`, or 500 with
//!   `{ error, kind }` where `kind` is `configuration` or `provider`.
//! - `GET /api/deployments/{id}` reads the current state once.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use launchpad_core::deploy::HostingProvider;
use launchpad_observe::attrs;
use launchpad_types::deploy::{DeployReport, FailureKind};
use launchpad_types::directive::{DeployDirective, DirectiveCode, DirectiveError};

use crate::http::error::AppError;
use crate::state::AppState;

/// A directive submitted directly rather than produced by a turn.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployBody {
    pub code: DirectiveCode,
    #[serde(default)]
    pub project_name: Option<String>,
}

impl DeployBody {
    pub fn into_directive(self) -> Result<DeployDirective, DirectiveError> {
        DeployDirective::validated(true, self.project_name.as_deref(), self.code)
    }
}

/// POST /api/deploy: submit and poll.
pub async fn deploy(
    State(state): State<AppState>,
    body: Result<Json<DeployBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let directive = body
        .into_directive()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let span = tracing::info_span!(
        "http.deploy",
        project = %directive.project_name(),
        deploy.id = tracing::field::Empty,
        deploy.url = tracing::field::Empty,
    );

    // Dropping this handler (client gone) drops the poll with it.
    let report = state
        .pipeline
        .run(&directive, &CancellationToken::new())
        .instrument(span.clone())
        .await;
    if let DeployReport::Live {
        url, deployment_id, ..
    } = &report
    {
        span.record(attrs::DEPLOY_ID, deployment_id.as_str());
        span.record(attrs::DEPLOY_URL, url.as_str());
    }

    match report {
        DeployReport::Failed {
            error,
            kind: FailureKind::Configuration,
        } => Err(AppError::Config(error)),
        DeployReport::Failed { .. } => {
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(report)).into_response())
        }
        DeployReport::Live { .. } => Ok(Json(report).into_response()),
    }
}

/// GET /api/deployments/{id}: one status read.
pub async fn deployment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let ready_state = state.hosting.ready_state(&id).await?;
    tracing::debug!(deployment = %id, %ready_state, "status read");

    Ok(Json(json!({
        "id": id,
        "readyState": ready_state,
        "terminal": ready_state.is_terminal(),
    }))
    .into_response())
}
