//! Chat endpoints.
//!
//! - `POST /api/chat` runs one non-streaming turn and returns the turn as JSON.
//! - `POST /api/chat/stream` runs one streaming turn as Server-Sent Events.
//!
//! SSE event types (the `event:` field), in emission order:
//! - `status`: `{ "type": "status", "status": "generating" | ... }`
//! - `text_delta`: `{ "type": "text_delta", "text": "..." }`
//! - `partial_code`: `{ "type": "partial_code", "code": "...", "path"?, "presentable" }`
//! - `reply`: `{ "type": "reply", "message", "shouldDeploy", "projectName"?, "code"? }`
//! - `done`: the whole turn, same shape as the `POST /api/chat` response
//! - `error`: `{ "error": "..." }` when generation failed before any text

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use launchpad_observe::attrs;
use launchpad_types::llm::{Message, MessageRole};

use crate::http::error::AppError;
use crate::output::TurnOutput;
use crate::state::AppState;

/// Request body shared by both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The conversation so far, oldest first, ending with the user's message.
    pub messages: Vec<Message>,
}

impl ChatRequest {
    fn into_history(self) -> Result<Vec<Message>, AppError> {
        if self.messages.is_empty() {
            return Err(AppError::Validation("messages must not be empty".to_string()));
        }
        if self.messages.iter().any(|m| m.role == MessageRole::System) {
            return Err(AppError::Validation(
                "system messages are not accepted".to_string(),
            ));
        }
        if self.messages.last().map(|m| &m.role) != Some(&MessageRole::User) {
            return Err(AppError::Validation(
                "the last message must come from the user".to_string(),
            ));
        }
        Ok(self.messages)
    }
}

fn parse_body(body: Result<Json<ChatRequest>, JsonRejection>) -> Result<Vec<Message>, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    body.into_history()
}

/// POST /api/chat: one non-streaming turn.
///
/// A failed deployment still answers 200: the reply is kept and the failure
/// is reported in `deployment` and `status`.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let history = parse_body(body)?;
    let orchestrator = state.orchestrator().map_err(AppError::Config)?;

    let span = tracing::info_span!(
        "http.chat",
        launchpad.turn_id = tracing::field::Empty,
        launchpad.status = tracing::field::Empty,
    );
    let report = orchestrator.run_complete(&history).instrument(span.clone()).await?;
    span.record(attrs::TURN_ID, tracing::field::display(report.turn_id));
    span.record(attrs::TURN_STATUS, report.status.name());

    Ok(Json(TurnOutput::from(&report)).into_response())
}

/// POST /api/chat/stream: one streaming turn as SSE.
///
/// The turn runs on its own task; disconnecting the client cancels it.
pub async fn stream_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let history = parse_body(body)?;
    let orchestrator = state.orchestrator().map_err(AppError::Config)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let turn = tokio::spawn({
        let cancel = cancel.clone();
        async move { orchestrator.run_streaming(&history, tx, cancel).await }
    });

    let sse_stream = async_stream::stream! {
        // Dropping the response stream (client gone) cancels the turn.
        let _guard = cancel.drop_guard();

        while let Some(event) = rx.recv().await {
            yield Ok::<_, Infallible>(sse_event(event.name(), &event));
        }

        match turn.await {
            Ok(Ok(report)) => {
                yield Ok(sse_event("done", &TurnOutput::from(&report)));
            }
            Ok(Err(e)) => {
                yield Ok(sse_event("error", &json!({ "error": e.to_string() })));
            }
            Err(e) => {
                tracing::error!(error = %e, "turn task failed");
                yield Ok(sse_event("error", &json!({ "error": "turn failed" })));
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn sse_event<T: Serialize>(name: &str, data: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, event = name, "failed to encode SSE event");
            Event::default().event("error").data(r#"{"error":"encoding failed"}"#)
        })
}
