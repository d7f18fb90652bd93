//! Shared domain types for Launchpad.
//!
//! This crate contains the types shared across the Launchpad workspace:
//! LLM request/stream shapes, the deploy directive, deployment records and
//! statuses, turn events for the presentation layer, and configuration.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod deploy;
pub mod directive;
pub mod event;
pub mod llm;
