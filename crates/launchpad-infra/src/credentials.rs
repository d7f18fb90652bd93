//! Environment credentials.
//!
//! Read-only lookup of the two secrets Launchpad needs. Values are wrapped in
//! [`SecretString`] as soon as they leave the environment.

use secrecy::SecretString;

/// Checked in order for the generation provider key.
pub const LLM_KEY_VARS: [&str; 2] = ["LAUNCHPAD_LLM_API_KEY", "OPENAI_API_KEY"];

pub const HOSTING_TOKEN_VAR: &str = "VERCEL_TOKEN";

/// Credentials resolved from environment variables.
///
/// Unset, empty, and non-Unicode variables all count as absent.
#[derive(Debug, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn new() -> Self {
        Self
    }

    pub fn llm_api_key(&self) -> Option<SecretString> {
        LLM_KEY_VARS.iter().find_map(|var| read_var(var))
    }

    pub fn hosting_token(&self) -> Option<SecretString> {
        read_var(HOSTING_TOKEN_VAR)
    }
}

fn read_var(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
        _ => None,
    }
}
