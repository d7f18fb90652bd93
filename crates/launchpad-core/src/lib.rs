//! Business logic for Launchpad.
//!
//! This crate turns a generation stream into a finalized reply and, when the
//! reply carries a deploy directive, into a hosted deployment. It defines the
//! "ports" ([`llm::provider::LlmProvider`], [`deploy::hosting::HostingProvider`])
//! that `launchpad-infra` implements, and depends only on `launchpad-types`.

pub mod deploy;
pub mod directive;
pub mod llm;
pub mod turn;
