//! Global configuration types for Launchpad.
//!
//! `LaunchpadConfig` represents the top-level `config.toml` that selects the
//! generation provider, the hosting target and the polling budget.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deploy::ProjectTemplate;

/// Top-level configuration. Loaded from `~/.launchpad/config.toml`; every
/// field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub deploy: DeploySettings,
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name: "openai", "gemini", "mistral", or any name with a `base_url`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Hosting provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySettings {
    #[serde(default = "default_deploy_base_url")]
    pub base_url: String,

    /// Deployment target ("production" or "preview").
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default)]
    pub template: ProjectTemplate,

    /// Team scope for the hosting account, if any.
    #[serde(default)]
    pub team_id: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_deploy_base_url() -> String {
    "https://api.vercel.com".to_string()
}

fn default_target() -> String {
    "production".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl DeploySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            base_url: default_deploy_base_url(),
            target: default_target(),
            template: ProjectTemplate::default(),
            team_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = LaunchpadConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.deploy.base_url, "https://api.vercel.com");
        assert_eq!(config.deploy.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.deploy.max_poll_attempts, 30);
        assert_eq!(config.deploy.template, ProjectTemplate::NextJs);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: LaunchpadConfig = toml::from_str("").unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.deploy.target, "production");
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[llm]
provider = "gemini"
model = "gemini-2.5-pro"
temperature = 0.4

[deploy]
template = "static"
team_id = "team_123"
max_poll_attempts = 10
"#;
        let config: LaunchpadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.llm.temperature, Some(0.4));
        assert_eq!(config.deploy.template, ProjectTemplate::Static);
        assert_eq!(config.deploy.team_id.as_deref(), Some("team_123"));
        assert_eq!(config.deploy.max_poll_attempts, 10);
        assert_eq!(config.deploy.poll_interval_ms, 2000);
    }
}
