//! Events delivered to the presentation layer during a turn.

use serde::Serialize;

use crate::deploy::DeploymentStatus;
use crate::directive::{PartialCode, TurnReply};

/// One observable step of a turn, in emission order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A raw text fragment as it arrived from the provider.
    TextDelta { text: String },
    /// A new live-preview snapshot of the directive's code.
    PartialCode(PartialCode),
    /// The finalized reply once the stream has ended.
    Reply(TurnReply),
    /// A deployment status transition.
    Status(DeploymentStatus),
}

impl TurnEvent {
    /// Stable event name, used as the SSE `event:` field.
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::TextDelta { .. } => "text_delta",
            TurnEvent::PartialCode(_) => "partial_code",
            TurnEvent::Reply(_) => "reply",
            TurnEvent::Status(_) => "status",
        }
    }
}
