//! Submit-then-poll pipeline producing a caller-facing [`DeployReport`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use launchpad_types::config::DeploySettings;
use launchpad_types::deploy::{DeployError, DeployReport, PollOutcome, STILL_BUILDING_NOTE};
use launchpad_types::directive::DeployDirective;

use super::hosting::HostingProvider;
use super::poller::{Clock, DeploymentPoller, RetryPolicy, TokioClock};
use super::submitter::DeploymentSubmitter;

/// Generic text for failures whose details only belong in the logs.
const GENERIC_FAILURE: &str = "Failed to deploy";

pub struct DeploymentPipeline<H, C = TokioClock> {
    submitter: DeploymentSubmitter<H>,
    poller: DeploymentPoller<H, C>,
}

impl<H: HostingProvider> DeploymentPipeline<H, TokioClock> {
    pub fn from_settings(hosting: Arc<H>, settings: &DeploySettings) -> Self {
        Self::new(
            DeploymentSubmitter::from_settings(hosting.clone(), settings),
            DeploymentPoller::new(hosting, RetryPolicy::from_settings(settings), TokioClock),
        )
    }
}

impl<H: HostingProvider, C: Clock> DeploymentPipeline<H, C> {
    pub fn new(submitter: DeploymentSubmitter<H>, poller: DeploymentPoller<H, C>) -> Self {
        Self { submitter, poller }
    }

    /// Submit a directive and poll it to an outcome.
    pub async fn run(&self, directive: &DeployDirective, cancel: &CancellationToken) -> DeployReport {
        let record = match self.submitter.submit(directive).await {
            Ok(record) => record,
            Err(e) => return failure(&e),
        };

        match self.poller.poll(record, cancel).await {
            Ok(PollOutcome::Ready(record)) => DeployReport::Live {
                url: record.url,
                deployment_id: record.id,
                note: None,
            },
            Ok(PollOutcome::Exhausted(record)) => DeployReport::Live {
                url: record.url,
                deployment_id: record.id,
                note: Some(STILL_BUILDING_NOTE.to_string()),
            },
            Ok(PollOutcome::Failed(record)) => failure(&DeployError::BuildFailed { id: record.id }),
            Ok(PollOutcome::Cancelled(record)) => failure(&DeployError::Cancelled { id: record.id }),
            Err(e) => failure(&e),
        }
    }
}

fn failure(error: &DeployError) -> DeployReport {
    let message = match error {
        DeployError::Transport(detail) | DeployError::Deserialization(detail) => {
            tracing::error!(detail = %detail, "deployment failed");
            GENERIC_FAILURE.to_string()
        }
        DeployError::MissingCredential(_) => {
            tracing::warn!(error = %error, "deployment skipped, hosting is not configured");
            error.to_string()
        }
        other => other.to_string(),
    };
    DeployReport::Failed {
        error: message,
        kind: error.kind(),
    }
}
