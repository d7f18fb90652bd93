//! Vercel REST API wire types (v13 deployments).

use serde::{Deserialize, Serialize};

use launchpad_types::deploy::{ReadyState, TemplateSettings};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentBody<'a> {
    pub name: &'a str,
    pub files: Vec<InlineFile<'a>>,
    pub target: &'a str,
    pub project_settings: &'a TemplateSettings,
}

/// One file sent inline, base64-encoded.
#[derive(Debug, Serialize)]
pub struct InlineFile<'a> {
    pub file: &'a str,
    pub data: String,
    pub encoding: &'static str,
}

/// Subset of the create/get deployment response we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResponse {
    pub id: String,
    /// Host name without scheme, e.g. `bean-abc123.vercel.app`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready_state: Option<ReadyState>,
}

/// `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
