//! A deterministic in-memory provider used by tests and as a template
//! for real provider implementations.

use async_trait::async_trait;
use async_stream::stream;

use crate::error::LlmResult;
use crate::provider::{LlmProvider, StreamBox};
use crate::types::{LlmResponse, LlmToolDefinition, Message, StopReason, StreamEvent, Usage};

/// Echoes the last user message back, word-streamed. Never calls out to
/// a network; exists so the registry, executor, and gateway have a real
/// provider to exercise in tests.
#[derive(Debug, Clone)]
pub struct EchoProvider {
    model: String,
}

impl EchoProvider {
    /// Construct an echo provider reporting `model` as its model name.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self::new("echo-1")
    }
}

fn last_user_text(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find_map(|m| m.text().map(ToString::to_string))
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<StreamBox> {
        let text = last_user_text(messages);
        let s = stream! {
            yield Ok(StreamEvent::SystemInit {
                conversation_id: format!("echo-conv-{}", text.len()),
            });
            let words: Vec<&str> = text.split_whitespace().collect();
            for (index, word) in words.iter().enumerate() {
                let delta = if index == 0 { (*word).to_string() } else { format!(" {word}") };
                yield Ok(StreamEvent::TextDelta(delta));
            }
            yield Ok(StreamEvent::Usage {
                input_tokens: text.len() / 4,
                output_tokens: text.len() / 4,
            });
            yield Ok(StreamEvent::Done);
        };
        Ok(Box::pin(s))
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<LlmResponse> {
        let text = last_user_text(messages);
        let tokens = text.len() / 4;
        Ok(LlmResponse {
            message: Message::assistant(text),
            has_tool_calls: false,
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: tokens,
                output_tokens: tokens,
            },
        })
    }

    fn max_context_length(&self) -> usize {
        200_000
    }
}
