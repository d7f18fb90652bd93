//! Token stream reader.
//!
//! Drains a provider event stream for one turn, rebuilding the running text
//! and feeding every fragment to the directive scanner. Text deltas and
//! preview snapshots are forwarded to the presentation layer as they arrive.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use launchpad_types::directive::PartialCode;
use launchpad_types::event::TurnEvent;
use launchpad_types::llm::{LlmError, StreamEvent, Usage};

use crate::directive::DirectiveScanner;

/// Why draining stopped.
#[derive(Debug)]
pub enum StreamEnd {
    /// Explicit end marker or the provider stream ended.
    Completed,
    /// The token fired or the event receiver went away.
    Cancelled,
    /// The provider failed mid-stream; the text read so far is kept.
    Failed(LlmError),
}

#[derive(Debug)]
pub struct StreamSummary {
    pub text: String,
    pub end: StreamEnd,
    pub usage: Option<Usage>,
    pub fragments: usize,
}

/// Owns the running text and scanner state for one turn.
#[derive(Debug, Default)]
pub struct TokenStreamReader {
    text: String,
    scanner: DirectiveScanner,
    fragments: usize,
}

impl TokenStreamReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment. Returns a preview snapshot when it changed.
    pub fn push(&mut self, fragment: &str) -> Option<PartialCode> {
        self.fragments += 1;
        if fragment.is_empty() {
            return None;
        }
        self.text.push_str(fragment);
        self.scanner.push(fragment)
    }

    /// Read the stream to its end, forwarding events as they arrive.
    ///
    /// The stream is dropped before returning, releasing the provider
    /// connection whatever the outcome.
    pub async fn drain<S>(
        mut self,
        stream: S,
        events: &UnboundedSender<TurnEvent>,
        cancel: &CancellationToken,
    ) -> StreamSummary
    where
        S: Stream<Item = Result<StreamEvent, LlmError>>,
    {
        let mut stream = std::pin::pin!(stream);
        let mut usage = None;

        let end = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StreamEnd::Cancelled,
                next = stream.next() => next,
            };

            match next {
                None | Some(Ok(StreamEvent::Done)) => break StreamEnd::Completed,
                Some(Ok(StreamEvent::TextDelta { text })) => {
                    let preview = self.push(&text);
                    if text.is_empty() {
                        continue;
                    }
                    if events.send(TurnEvent::TextDelta { text }).is_err() {
                        tracing::debug!("event receiver dropped, cancelling stream");
                        break StreamEnd::Cancelled;
                    }
                    if let Some(preview) = preview {
                        tracing::debug!(
                            chars = preview.code.len(),
                            path = ?preview.path,
                            "preview snapshot"
                        );
                        if events.send(TurnEvent::PartialCode(preview)).is_err() {
                            break StreamEnd::Cancelled;
                        }
                    }
                }
                Some(Ok(StreamEvent::Usage(u))) => usage = Some(u),
                Some(Ok(StreamEvent::MessageDelta { stop_reason })) => {
                    tracing::debug!(%stop_reason, "stream stop reason");
                }
                Some(Ok(StreamEvent::Connected)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, chars = self.text.len(), "stream failed mid-turn");
                    break StreamEnd::Failed(e);
                }
            }
        };

        StreamSummary {
            text: self.text,
            end,
            usage,
            fragments: self.fragments,
        }
    }
}
