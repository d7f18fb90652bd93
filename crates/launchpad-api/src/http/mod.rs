//! HTTP API layer for Launchpad.
//!
//! Axum-based JSON + SSE API under `/api/`, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;
