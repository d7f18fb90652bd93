//! Generation provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `launchpad-core`, plus [`create_provider`], which picks
//! the concrete provider from [`LlmSettings`].
//!
//! [`LlmProvider`]: launchpad_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use launchpad_core::llm::box_provider::BoxLlmProvider;
use launchpad_types::config::LlmSettings;
use launchpad_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from [`LlmSettings`].
///
/// A configured `base_url` always wins; otherwise the well-known provider
/// names map to their default endpoints. Unknown names without a base URL
/// are rejected rather than silently sent to OpenAI.
pub fn create_provider(
    settings: &LlmSettings,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;

    let provider = match settings.base_url.as_deref() {
        Some(base_url) => OpenAiCompatibleProvider::new(openai_compat::config::custom(
            &settings.provider,
            base_url,
            key,
            &settings.model,
        )),
        None => match settings.provider.as_str() {
            "openai" => OpenAiCompatibleProvider::openai(key, &settings.model),
            "gemini" => OpenAiCompatibleProvider::gemini(key, &settings.model),
            "mistral" => OpenAiCompatibleProvider::mistral(key, &settings.model),
            other => {
                return Err(LlmError::InvalidRequest(format!(
                    "unknown provider '{other}' (set llm.base_url for custom endpoints)"
                )));
            }
        },
    };

    tracing::debug!(
        provider = %settings.provider,
        model = %settings.model,
        "generation provider created"
    );
    Ok(BoxLlmProvider::new(provider))
}
