//! Span attribute names.
//!
//! GenAI names follow the OpenTelemetry GenAI semantic conventions. Usable
//! with `Span::record`, which takes the field name as a string.

// --- GenAI ---

pub const GEN_AI_SYSTEM: &str = "gen_ai.system";

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

// --- Turn ---

pub const TURN_ID: &str = "launchpad.turn_id";

/// Final caller-facing status name (`idle`, `complete`, `error`).
pub const TURN_STATUS: &str = "launchpad.status";

// --- Deployment ---

pub const DEPLOY_ID: &str = "deploy.id";

pub const DEPLOY_URL: &str = "deploy.url";

pub const DEPLOY_ATTEMPTS: &str = "deploy.attempts";

pub const DEPLOY_READY_STATE: &str = "deploy.ready_state";
