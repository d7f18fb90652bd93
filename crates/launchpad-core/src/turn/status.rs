//! Caller-facing deployment status for one turn.
//!
//! Allowed transitions:
//!
//! ```text
//! idle -> generating -> deploying -> complete | error
//!              \-> idle    (turn ended without a deployable directive)
//!              \-> error   (generation failed)
//! ```
//!
//! Every accepted transition is forwarded as a `TurnEvent::Status`.

use tokio::sync::mpsc::UnboundedSender;

use launchpad_types::deploy::DeploymentStatus;
use launchpad_types::event::TurnEvent;

#[derive(Debug)]
pub struct StatusTracker {
    current: DeploymentStatus,
    events: Option<UnboundedSender<TurnEvent>>,
}

impl StatusTracker {
    pub fn new(events: Option<UnboundedSender<TurnEvent>>) -> Self {
        Self {
            current: DeploymentStatus::Idle,
            events,
        }
    }

    pub fn current(&self) -> &DeploymentStatus {
        &self.current
    }

    fn allowed(from: &DeploymentStatus, to: &DeploymentStatus) -> bool {
        use DeploymentStatus::*;
        matches!(
            (from, to),
            (Idle, Generating)
                | (Generating, Idle | Deploying | Error { .. })
                | (Deploying, Complete { .. } | Error { .. })
                | (Complete { .. } | Error { .. }, Generating)
        )
    }

    /// Move to `next`. Rejected transitions are logged and leave the state unchanged.
    pub fn advance(&mut self, next: DeploymentStatus) -> bool {
        if !Self::allowed(&self.current, &next) {
            tracing::warn!(
                from = self.current.name(),
                to = next.name(),
                "ignoring invalid status transition"
            );
            return false;
        }

        tracing::info!(from = self.current.name(), to = next.name(), "status changed");
        if let Some(events) = &self.events {
            // A closed receiver only means nobody is watching any more.
            let _ = events.send(TurnEvent::Status(next.clone()));
        }
        self.current = next;
        true
    }
}
