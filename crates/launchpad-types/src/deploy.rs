//! Deployment domain types.
//!
//! Models the hosting side of a turn: project templates and their build
//! settings, the file set submitted for a build, the deployment record the
//! poller advances, and the caller-facing status/report shapes.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Note attached to a success report when polling ran out before READY.
pub const STILL_BUILDING_NOTE: &str = "Deployment may still be building";

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Project scaffold a directive's code is inserted into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectTemplate {
    /// Next.js app router project built by the provider.
    #[default]
    #[serde(rename = "nextjs")]
    NextJs,
    /// Plain static files served as-is.
    Static,
}

impl fmt::Display for ProjectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectTemplate::NextJs => write!(f, "nextjs"),
            ProjectTemplate::Static => write!(f, "static"),
        }
    }
}

impl FromStr for ProjectTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nextjs" | "next" => Ok(ProjectTemplate::NextJs),
            "static" | "html" => Ok(ProjectTemplate::Static),
            other => Err(format!("invalid project template: '{other}'")),
        }
    }
}

/// Fixed build/runtime settings sent with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSettings {
    /// Framework preset; `None` means "other" (no build step detection).
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
}

impl TemplateSettings {
    pub fn for_template(template: ProjectTemplate) -> Self {
        match template {
            ProjectTemplate::NextJs => Self {
                framework: Some("nextjs".to_string()),
                install_command: Some("npm install".to_string()),
                build_command: Some("npm run build".to_string()),
                output_directory: Some(".next".to_string()),
            },
            ProjectTemplate::Static => Self {
                framework: None,
                install_command: None,
                build_command: None,
                output_directory: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// File set
// ---------------------------------------------------------------------------

/// One file of a project, by relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
}

/// Ordered mapping from relative path to content.
///
/// Insertion order is preserved; inserting an existing path replaces its
/// content in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFileSet {
    files: Vec<ProjectFile>,
}

impl ProjectFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.content = content,
            None => self.files.push(ProjectFile { path, content }),
        }
    }

    /// Insert only when the path is not present yet.
    pub fn insert_default(&mut self, path: &str, content: impl FnOnce() -> String) {
        if !self.contains(path) {
            self.files.push(ProjectFile {
                path: path.to_string(),
                content: content(),
            });
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Everything a hosting provider needs for one build.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub name: String,
    pub target: String,
    pub files: ProjectFileSet,
    pub settings: TemplateSettings,
}

// ---------------------------------------------------------------------------
// Deployment lifecycle
// ---------------------------------------------------------------------------

/// The hosting provider's lifecycle state for a deployment.
///
/// Unknown strings are carried verbatim and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReadyState {
    Queued,
    Initializing,
    Building,
    Ready,
    Error,
    Canceled,
    Other(String),
}

impl ReadyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReadyState::Ready | ReadyState::Error | ReadyState::Canceled)
    }
}

impl From<String> for ReadyState {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "QUEUED" => ReadyState::Queued,
            "INITIALIZING" => ReadyState::Initializing,
            "BUILDING" => ReadyState::Building,
            "READY" => ReadyState::Ready,
            "ERROR" => ReadyState::Error,
            "CANCELED" => ReadyState::Canceled,
            _ => ReadyState::Other(s),
        }
    }
}

impl From<ReadyState> for String {
    fn from(state: ReadyState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyState::Queued => write!(f, "QUEUED"),
            ReadyState::Initializing => write!(f, "INITIALIZING"),
            ReadyState::Building => write!(f, "BUILDING"),
            ReadyState::Ready => write!(f, "READY"),
            ReadyState::Error => write!(f, "ERROR"),
            ReadyState::Canceled => write!(f, "CANCELED"),
            ReadyState::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// A submitted deployment. Created as `Queued`; only the poller advances it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,
    /// Public URL including scheme.
    pub url: String,
    pub ready_state: ReadyState,
}

impl DeploymentRecord {
    pub fn queued(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ready_state: ReadyState::Queued,
        }
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Provider reported READY.
    Ready(DeploymentRecord),
    /// Provider reported ERROR or CANCELED.
    Failed(DeploymentRecord),
    /// Attempt budget spent while still in progress.
    Exhausted(DeploymentRecord),
    /// The cancellation token fired before a terminal state.
    Cancelled(DeploymentRecord),
}

impl PollOutcome {
    pub fn record(&self) -> &DeploymentRecord {
        match self {
            PollOutcome::Ready(r)
            | PollOutcome::Failed(r)
            | PollOutcome::Exhausted(r)
            | PollOutcome::Cancelled(r) => r,
        }
    }
}

/// Errors from deployment submission and polling.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{0} is not configured")]
    MissingCredential(String),

    #[error("invalid directive: {0}")]
    InvalidDirective(String),

    /// Non-2xx from the provider; `message` is the provider's own text when present.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Deployment failed during build")]
    BuildFailed { id: String },

    #[error("Deployment was cancelled")]
    Cancelled { id: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl DeployError {
    /// Configuration problems are reported apart from provider failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DeployError::MissingCredential(_))
    }

    pub fn kind(&self) -> FailureKind {
        if self.is_configuration() {
            FailureKind::Configuration
        } else {
            FailureKind::Provider
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-facing shapes
// ---------------------------------------------------------------------------

/// Whether a failure needs the operator to configure something or came
/// from the provider side (rejection, build failure, transport).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Configuration,
    #[default]
    Provider,
}

/// Externally observable deployment state for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeploymentStatus {
    Idle,
    Generating,
    Deploying,
    Complete {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    Error {
        error: String,
        #[serde(default)]
        kind: FailureKind,
    },
}

impl DeploymentStatus {
    /// A provider-side failure status.
    pub fn error(error: impl Into<String>) -> Self {
        DeploymentStatus::Error {
            error: error.into(),
            kind: FailureKind::Provider,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeploymentStatus::Idle => "idle",
            DeploymentStatus::Generating => "generating",
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Complete { .. } => "complete",
            DeploymentStatus::Error { .. } => "error",
        }
    }
}

/// Result of a full submit-and-poll run.
///
/// Serializes to `{ success: true, url, deploymentId, note? }` or
/// `{ error, kind }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployReport {
    Live {
        url: String,
        deployment_id: String,
        note: Option<String>,
    },
    Failed {
        error: String,
        kind: FailureKind,
    },
}

impl DeployReport {
    /// A provider-side failure report.
    pub fn failed(error: impl Into<String>) -> Self {
        DeployReport::Failed {
            error: error.into(),
            kind: FailureKind::Provider,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeployReport::Live { .. })
    }

    /// The terminal caller-facing status for this report.
    pub fn status(&self) -> DeploymentStatus {
        match self {
            DeployReport::Live { url, note, .. } => DeploymentStatus::Complete {
                url: url.clone(),
                note: note.clone(),
            },
            DeployReport::Failed { error, kind } => DeploymentStatus::Error {
                error: error.clone(),
                kind: *kind,
            },
        }
    }
}

impl Serialize for DeployReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DeployReport::Live {
                url,
                deployment_id,
                note,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("url", url)?;
                map.serialize_entry("deploymentId", deployment_id)?;
                if let Some(note) = note {
                    map.serialize_entry("note", note)?;
                }
                map.end()
            }
            DeployReport::Failed { error, kind } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("kind", kind)?;
                map.end()
            }
        }
    }
}
