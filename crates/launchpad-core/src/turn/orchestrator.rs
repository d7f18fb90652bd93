//! Turn orchestration.
//!
//! One call per user turn: generate (streaming or not), finalize the reply,
//! and when it carries a deployable directive, submit and poll it. All
//! per-turn state (running text, scanner, status, deployment record) lives
//! inside the call.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use launchpad_types::deploy::{DeployReport, DeploymentStatus, FailureKind};
use launchpad_types::directive::TurnReply;
use launchpad_types::event::TurnEvent;
use launchpad_types::llm::{LlmError, Message, Usage};

use crate::deploy::hosting::HostingProvider;
use crate::deploy::pipeline::DeploymentPipeline;
use crate::deploy::poller::{Clock, TokioClock};
use crate::directive::finalize;

use super::engine::GenerationEngine;
use super::reader::{StreamEnd, TokenStreamReader};
use super::status::StatusTracker;

/// Everything a finished turn produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub turn_id: Uuid,
    pub reply: TurnReply,
    pub deployment: Option<DeployReport>,
    /// Assistant message announcing a live deployment.
    pub follow_up: Option<String>,
    pub status: DeploymentStatus,
    pub cancelled: bool,
    pub usage: Option<Usage>,
}

pub struct TurnOrchestrator<H, C = TokioClock> {
    engine: GenerationEngine,
    pipeline: Arc<DeploymentPipeline<H, C>>,
    auto_deploy: bool,
}

impl<H: HostingProvider, C: Clock> TurnOrchestrator<H, C> {
    pub fn new(engine: GenerationEngine, pipeline: Arc<DeploymentPipeline<H, C>>) -> Self {
        Self {
            engine,
            pipeline,
            auto_deploy: true,
        }
    }

    /// Finalize replies without deploying their directives.
    pub fn with_auto_deploy(mut self, auto_deploy: bool) -> Self {
        self.auto_deploy = auto_deploy;
        self
    }

    /// Run a streaming turn, forwarding every event through `events`.
    ///
    /// Fails only when generation fails before producing any text.
    pub async fn run_streaming(
        &self,
        history: &[Message],
        events: UnboundedSender<TurnEvent>,
        cancel: CancellationToken,
    ) -> Result<TurnReport, LlmError> {
        let turn_id = Uuid::now_v7();
        let span = info_span!(
            "launchpad.turn",
            turn.id = %turn_id,
            turn.stream = true,
            turn.messages = history.len(),
        );

        async {
            let mut tracker = StatusTracker::new(Some(events.clone()));
            tracker.advance(DeploymentStatus::Generating);

            let stream = self.engine.stream(history);
            let summary = TokenStreamReader::new().drain(stream, &events, &cancel).await;
            tracing::debug!(fragments = summary.fragments, chars = summary.text.len(), "stream drained");

            let cancelled = match summary.end {
                StreamEnd::Completed => false,
                StreamEnd::Cancelled => true,
                StreamEnd::Failed(e) if summary.text.trim().is_empty() => {
                    tracker.advance(generation_failed(&e));
                    return Err(e);
                }
                // Keep what arrived before the failure.
                StreamEnd::Failed(_) => false,
            };

            self.finish(turn_id, summary.text, summary.usage, cancelled, tracker, Some(&events), &cancel)
                .await
        }
        .instrument(span)
        .await
    }

    /// Run a non-streaming turn.
    pub async fn run_complete(&self, history: &[Message]) -> Result<TurnReport, LlmError> {
        let turn_id = Uuid::now_v7();
        let span = info_span!(
            "launchpad.turn",
            turn.id = %turn_id,
            turn.stream = false,
            turn.messages = history.len(),
        );

        async {
            let mut tracker = StatusTracker::new(None);
            tracker.advance(DeploymentStatus::Generating);

            let response = match self.engine.complete(history).await {
                Ok(response) => response,
                Err(e) => {
                    tracker.advance(generation_failed(&e));
                    return Err(e);
                }
            };

            let cancel = CancellationToken::new();
            self.finish(turn_id, response.content, Some(response.usage), false, tracker, None, &cancel)
                .await
        }
        .instrument(span)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        turn_id: Uuid,
        text: String,
        usage: Option<Usage>,
        cancelled: bool,
        mut tracker: StatusTracker,
        events: Option<&UnboundedSender<TurnEvent>>,
        cancel: &CancellationToken,
    ) -> Result<TurnReport, LlmError> {
        if text.trim().is_empty() && !cancelled {
            let error = LlmError::Provider {
                message: "no response from the model".to_string(),
            };
            tracker.advance(generation_failed(&error));
            return Err(error);
        }

        let reply = finalize(&text);
        if let Some(events) = events {
            let _ = events.send(TurnEvent::Reply(reply.clone()));
        }

        let directive = reply
            .deployable()
            .filter(|_| self.auto_deploy && !cancelled)
            .cloned();

        let Some(directive) = directive else {
            if reply.should_deploy() {
                tracing::info!(cancelled, "deployable directive left undeployed");
            }
            tracker.advance(DeploymentStatus::Idle);
            return Ok(TurnReport {
                turn_id,
                reply,
                deployment: None,
                follow_up: None,
                status: tracker.current().clone(),
                cancelled,
                usage,
            });
        };

        tracker.advance(DeploymentStatus::Deploying);
        let report = self.pipeline.run(&directive, cancel).await;
        tracker.advance(report.status());

        Ok(TurnReport {
            turn_id,
            follow_up: follow_up_message(&report),
            reply,
            deployment: Some(report),
            status: tracker.current().clone(),
            cancelled: cancel.is_cancelled(),
            usage,
        })
    }
}

/// Status for a turn whose generation step failed. A missing or rejected
/// API key is a configuration problem.
fn generation_failed(error: &LlmError) -> DeploymentStatus {
    let kind = match error {
        LlmError::AuthenticationFailed => FailureKind::Configuration,
        _ => FailureKind::Provider,
    };
    DeploymentStatus::Error {
        error: error.to_string(),
        kind,
    }
}

/// The assistant message that announces a live deployment.
pub fn follow_up_message(report: &DeployReport) -> Option<String> {
    let DeployReport::Live { url, note, .. } = report else {
        return None;
    };
    let mut message = format!(
        "🚀 **Your app is live!**\n\n[{url}]({url})\n\nOpen the link to try it out, and tell me if you'd like any changes."
    );
    if let Some(note) = note {
        message.push_str(&format!("\n\n_{note}; give it a minute if the page is not up yet._"));
    }
    Some(message)
}
