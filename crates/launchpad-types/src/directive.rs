//! Deploy directive types.
//!
//! A deploy directive is the fenced JSON block a generation turn embeds in its
//! reply to ask for a deployment:
//!
//! ````text
//! ```DEPLOY_CONFIG
//! { "shouldDeploy": true, "projectName": "bean-there", "code": "<h1>Hi</h1>" }
//! ```
//! ````
//!
//! `code` arrives either as one markup string or as a map of file path to
//! contents. The wire shape is decided once at the parse boundary and carried
//! as the explicit [`DirectiveCode`] variant from then on.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Marker that opens a directive block.
pub const FENCE_OPEN: &str = "```DEPLOY_CONFIG";

/// Marker that closes a directive block.
pub const FENCE_CLOSE: &str = "```";

/// Project name used when the directive does not carry one.
pub const DEFAULT_PROJECT_NAME: &str = "my-app";

/// Visible reply used when stripping the directive leaves no text.
pub const FALLBACK_MESSAGE: &str = "Building your app now! 🚀";

/// Longest project name the hosting provider accepts.
const MAX_PROJECT_NAME_LEN: usize = 100;

/// The `code` payload of a directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveCode {
    /// A single markup/source document placed at the template's primary slot.
    Markup(String),
    /// Named files keyed by relative path (or a well-known short name).
    Files(BTreeMap<String, String>),
}

impl DirectiveCode {
    pub fn is_empty(&self) -> bool {
        match self {
            DirectiveCode::Markup(source) => source.trim().is_empty(),
            DirectiveCode::Files(files) => files.is_empty(),
        }
    }
}

/// Why a parsed directive body was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("directive body is not valid JSON: {0}")]
    Syntax(String),

    #[error("directive carries no code")]
    EmptyCode,

    #[error("directive file has an empty path")]
    EmptyPath,
}

/// A validated, immutable deploy directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployDirective {
    should_deploy: bool,
    project_name: String,
    code: DirectiveCode,
}

impl DeployDirective {
    /// Validate and normalize the fields of a parsed directive body.
    ///
    /// The project name falls back to [`DEFAULT_PROJECT_NAME`] and is
    /// slugified to the hosting provider's naming rules.
    pub fn validated(
        should_deploy: bool,
        project_name: Option<&str>,
        code: DirectiveCode,
    ) -> Result<Self, DirectiveError> {
        if code.is_empty() {
            return Err(DirectiveError::EmptyCode);
        }
        if let DirectiveCode::Files(files) = &code {
            if files.keys().any(|path| path.trim().is_empty()) {
                return Err(DirectiveError::EmptyPath);
            }
        }

        Ok(Self {
            should_deploy,
            project_name: slugify_project_name(project_name.unwrap_or(DEFAULT_PROJECT_NAME)),
            code,
        })
    }

    pub fn should_deploy(&self) -> bool {
        self.should_deploy
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn code(&self) -> &DirectiveCode {
        &self.code
    }
}

/// Normalize a free-form project name into a hosting-safe slug.
///
/// Lowercases, maps anything outside `[a-z0-9._-]` to `-`, collapses dash
/// runs, trims leading/trailing dashes and caps the length.
pub fn slugify_project_name(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        let mapped = if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            c
        } else {
            '-'
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }

    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > MAX_PROJECT_NAME_LEN {
        slug.truncate(MAX_PROJECT_NAME_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }

    if slug.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        slug
    }
}

/// A best-effort decode of the `code` value while it is still streaming.
///
/// Never final: only [`DeployDirective::code`] may feed a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCode {
    /// Decoded characters seen so far.
    pub code: String,
    /// File currently being written, for the multi-file shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether the snapshot looks like markup worth showing in a preview.
    pub presentable: bool,
}

impl PartialCode {
    pub fn new(code: String, path: Option<String>) -> Self {
        let presentable = code.contains('<');
        Self {
            code,
            path,
            presentable,
        }
    }
}

/// The finalized reply for one generation turn.
///
/// Serializes to the presentation-layer shape
/// `{ message, shouldDeploy, projectName?, code? }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub message: String,
    pub directive: Option<DeployDirective>,
}

impl TurnReply {
    /// A plain conversational reply with no directive.
    pub fn conversational(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            directive: None,
        }
    }

    pub fn should_deploy(&self) -> bool {
        self.directive.as_ref().is_some_and(DeployDirective::should_deploy)
    }

    /// The directive, only when it asks for a deployment.
    pub fn deployable(&self) -> Option<&DeployDirective> {
        self.directive.as_ref().filter(|d| d.should_deploy())
    }
}

impl Serialize for TurnReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.directive.is_some() { 4 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("shouldDeploy", &self.should_deploy())?;
        if let Some(directive) = &self.directive {
            map.serialize_entry("projectName", directive.project_name())?;
            map.serialize_entry("code", directive.code())?;
        }
        map.end()
    }
}
