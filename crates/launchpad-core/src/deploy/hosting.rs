//! HostingProvider trait definition.

use std::future::Future;

use launchpad_types::deploy::{DeployError, DeploymentRecord, DeploymentRequest, ReadyState};

/// Trait for hosting backends that build and serve a submitted file set.
///
/// Implementations live in launchpad-infra (e.g., `VercelClient`). Tests use
/// scripted fakes.
pub trait HostingProvider: Send + Sync {
    /// Human-readable provider name (e.g., "vercel").
    fn name(&self) -> &str;

    /// Submit one build. Returns the new record in the `Queued` state.
    fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> impl Future<Output = Result<DeploymentRecord, DeployError>> + Send;

    /// Read the current lifecycle state of a deployment.
    fn ready_state(&self, id: &str) -> impl Future<Output = Result<ReadyState, DeployError>> + Send;
}
