//! Generation engine for Launchpad.
//!
//! GenerationEngine assembles the CompletionRequest from the conversation
//! history and the template's system prompt, sends it through BoxLlmProvider,
//! and returns streaming events or the full response. OTel GenAI spans
//! instrument every call.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use pin_project_lite::pin_project;
use tracing::{Instrument, info_span};

use launchpad_types::config::LlmSettings;
use launchpad_types::deploy::ProjectTemplate;
use launchpad_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message, StreamEvent};

use crate::llm::box_provider::BoxLlmProvider;

use super::prompt::build_system_prompt;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

pub struct GenerationEngine {
    provider: BoxLlmProvider,
    settings: LlmSettings,
    system_prompt: String,
}

impl GenerationEngine {
    pub fn new(provider: BoxLlmProvider, settings: LlmSettings, template: ProjectTemplate) -> Self {
        Self {
            provider,
            settings,
            system_prompt: build_system_prompt(template),
        }
    }

    /// Start a streaming call for the conversation so far.
    pub fn stream(&self, history: &[Message]) -> EventStream {
        let request = self.build_request(history, true);

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = true,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        let inner = self.provider.stream(request);
        Box::pin(StreamInSpan { inner, span })
    }

    /// Run a non-streaming call and return the full response.
    pub async fn complete(&self, history: &[Message]) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(history, false);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        async {
            let response = self.provider.complete(&request).await?;
            let span = tracing::Span::current();
            span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
            span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
            Ok(response)
        }
        .instrument(span)
        .await
    }

    fn build_request(&self, history: &[Message], stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: history.to_vec(),
            system: Some(self.system_prompt.clone()),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream,
        }
    }
}

pin_project! {
    /// Keeps the generation span entered while the stream is polled and
    /// records token usage on it when the provider reports it.
    struct StreamInSpan {
        #[pin]
        inner: EventStream,
        span: tracing::Span,
    }
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let _enter = this.span.enter();
        let next = this.inner.poll_next(cx);
        if let Poll::Ready(Some(Ok(StreamEvent::Usage(usage)))) = &next {
            this.span.record("gen_ai.usage.input_tokens", usage.input_tokens);
            this.span.record("gen_ai.usage.output_tokens", usage.output_tokens);
        }
        next
    }
}
