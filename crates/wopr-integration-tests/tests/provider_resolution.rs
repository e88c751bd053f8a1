//! S4 (fallback) and S5 (stale resume) from spec.md §8.

mod common;

use std::sync::Arc;

use wopr_llm::StreamEvent;
use wopr_queue::InjectPayload;
use wopr_sessions::ProviderSelection;
use wopr_test::{ScriptedProvider, ScriptedStep};

use common::Harness;

/// S4: `p1` is configured as primary with `p2` as fallback. `p1` looks
/// available but fails on its first (only) scripted call; `p2` answers
/// normally. The response comes from `p2`, and `p1`'s availability flag
/// is untouched (health and fallback-on-failure are independent, per
/// spec.md §9).
#[tokio::test]
async fn test_s4_fallback_provider_answers_when_primary_fails_mid_call() {
    let harness = Harness::new();
    harness.providers.register("p1", Arc::new(ScriptedProvider::new("p1", vec![ScriptedStep::Fail("p1 is down".to_string())])));
    harness.providers.register("p2", Arc::new(ScriptedProvider::new("p2", vec![ScriptedStep::text("from p2")])));
    harness
        .sessions
        .set_provider("alice", &ProviderSelection { name: "p1".to_string(), model: None, fallback: vec!["p2".to_string()] })
        .await
        .unwrap();

    let result = harness.queue.inject("alice", InjectPayload::new(serde_json::json!("hi"), "cli")).await.unwrap();

    assert_eq!(result.response, "from p2");
    assert!(
        harness.providers.resolve_provider(&wopr_llm::ResolveConfig::single("p1")).is_ok(),
        "p1's availability flag must remain true; fallback-on-failure is not a health update"
    );
}

/// S5: a session with a previously saved conversation id hits a stale
/// "no such conversation" error on its first stream attempt; the
/// executor drops the stale id and retries once, succeeding and saving
/// the new conversation id. Only one retry is made.
#[tokio::test]
async fn test_s5_stale_resume_retries_once_and_saves_new_conversation_id() {
    let harness = Harness::new();
    harness.sessions.save_session_id("alice", "conv-old").await.unwrap();

    let provider = ScriptedProvider::new(
        "resumer",
        vec![
            ScriptedStep::Fail("no such conversation".to_string()),
            ScriptedStep::Events(vec![
                StreamEvent::SystemInit { conversation_id: "conv-new".to_string() },
                StreamEvent::TextDelta("resumed response".to_string()),
                StreamEvent::Done,
            ]),
        ],
    );
    harness.providers.register("resumer", Arc::new(provider));
    harness.sessions.set_provider("alice", &ProviderSelection::new("resumer")).await.unwrap();

    let result = harness.queue.inject("alice", InjectPayload::new(serde_json::json!("hi"), "cli")).await.unwrap();

    assert_eq!(result.response, "resumed response");
    assert_eq!(result.conversation_id.as_deref(), Some("conv-new"));
    assert_eq!(harness.sessions.get_sessions().await.unwrap().get("alice").map(String::as_str), Some("conv-new"));
}
