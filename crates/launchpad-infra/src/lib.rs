//! Infrastructure implementations for Launchpad.
//!
//! Concrete adapters behind the traits defined in `launchpad-core`:
//! the OpenAI-compatible generation provider, the Vercel hosting client,
//! plus configuration, credential and data-directory helpers.

pub mod config;
pub mod credentials;
pub mod deploy;
pub mod filesystem;
pub mod llm;
