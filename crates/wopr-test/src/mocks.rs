//! A scriptable [`wopr_llm::LlmProvider`] mock.
//!
//! Each call to [`ScriptedProvider::stream`] or `complete` pops the next
//! [`ScriptedStep`] off a queue set up at construction time. This is how
//! the fallback (§8 S4), stale-resume (§8 S5), and idle-timeout scenarios
//! drive a provider through a specific sequence of behaviors without a
//! real network call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_stream::stream;
use async_trait::async_trait;

use wopr_llm::{
    LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason,
    StreamBox, StreamEvent, Usage,
};

/// One scripted outcome for a single call to [`ScriptedProvider::stream`]
/// or [`ScriptedProvider::complete`].
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Emit this exact sequence of events, in order (streaming callers),
    /// or the concatenation of any `TextDelta`s as the response text
    /// (non-streaming callers).
    Events(Vec<StreamEvent>),
    /// Fail the call outright with this error message.
    Fail(String),
    /// Stream that never produces an event and never completes, for
    /// exercising the executor's idle-timeout path. Non-streaming callers
    /// get a [`LlmError::StreamingError`] instead, since `complete` has no
    /// timeout of its own to exercise.
    Hang,
}

impl ScriptedStep {
    /// Convenience constructor for the common case: a single `TextDelta`
    /// plus `Done`, nothing else scripted.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Events(vec![StreamEvent::TextDelta(body.into()), StreamEvent::Done])
    }
}

/// A mock provider whose call-by-call behavior is scripted up front.
///
/// Calls beyond the scripted queue fall back to a trivial empty `Done`
/// stream rather than panicking, so tests that only care about the first
/// few calls don't need to pad the script.
pub struct ScriptedProvider {
    name: String,
    model: String,
    max_context_length: usize,
    steps: Mutex<VecDeque<ScriptedStep>>,
}

impl ScriptedProvider {
    /// Build a provider named `name` that will answer calls with `steps`
    /// in order.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<ScriptedStep>) -> Self {
        Self {
            name: name.into(),
            model: "scripted-1".to_string(),
            max_context_length: 200_000,
            steps: Mutex::new(steps.into()),
        }
    }

    /// Override the reported model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the reported max context length.
    #[must_use]
    pub fn with_max_context_length(mut self, max: usize) -> Self {
        self.max_context_length = max;
        self
    }

    fn next_step(&self) -> Option<ScriptedStep> {
        self.steps.lock().expect("scripted provider mutex poisoned").pop_front()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<StreamBox> {
        match self.next_step() {
            Some(ScriptedStep::Events(events)) => Ok(Box::pin(stream! {
                for event in events {
                    yield Ok(event);
                }
            })),
            None => Ok(Box::pin(stream! {
                yield Ok(StreamEvent::Done);
            })),
            Some(ScriptedStep::Fail(message)) => Err(LlmError::StreamingError(message)),
            Some(ScriptedStep::Hang) => Ok(Box::pin(stream! {
                std::future::pending::<()>().await;
                #[allow(unreachable_code)]
                if false {
                    yield Ok(StreamEvent::Done);
                }
            })),
        }
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<LlmResponse> {
        match self.next_step() {
            None => Ok(LlmResponse {
                message: Message::assistant(""),
                has_tool_calls: false,
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            }),
            Some(ScriptedStep::Events(events)) => {
                let text: String = events
                    .iter()
                    .filter_map(|event| match event {
                        StreamEvent::TextDelta(delta) => Some(delta.as_str()),
                        _ => None,
                    })
                    .collect();
                Ok(LlmResponse {
                    message: Message::assistant(text),
                    has_tool_calls: false,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                })
            }
            Some(ScriptedStep::Fail(message)) => Err(LlmError::StreamingError(message)),
            Some(ScriptedStep::Hang) => {
                Err(LlmError::StreamingError("scripted hang has no non-streaming equivalent".to_string()))
            }
        }
    }

    fn max_context_length(&self) -> usize {
        self.max_context_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_replays_scripted_events_in_order() {
        let provider = ScriptedProvider::new("primary", vec![ScriptedStep::text("hi")]);
        let mut stream = provider.stream(&[], &[], "").await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event.unwrap());
        }
        assert!(matches!(events[0], StreamEvent::TextDelta(ref t) if t == "hi"));
        assert!(matches!(events[1], StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_stream_fails_on_scripted_failure() {
        let provider = ScriptedProvider::new("flaky", vec![ScriptedStep::Fail("boom".to_string())]);
        let result = provider.stream(&[], &[], "").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_exhausted_script_falls_back_to_done() {
        let provider = ScriptedProvider::new("empty", vec![]);
        let mut stream = provider.stream(&[], &[], "").await.unwrap();
        let event = stream.next().await.unwrap().unwrap();
        assert!(matches!(event, StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_second_call_uses_second_scripted_step() {
        let provider = ScriptedProvider::new(
            "sequenced",
            vec![ScriptedStep::text("first"), ScriptedStep::text("second")],
        );
        let response = provider.complete(&[], &[], "").await.unwrap();
        assert_eq!(response.message.text(), Some("first"));
        let response = provider.complete(&[], &[], "").await.unwrap();
        assert_eq!(response.message.text(), Some("second"));
    }
}
