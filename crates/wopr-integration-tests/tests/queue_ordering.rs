//! S1 (ordering) and S2 (cancel) from spec.md §8.

mod common;

use std::time::Duration;

use wopr_llm::EchoProvider;
use wopr_queue::InjectPayload;
use wopr_test::ScriptedProvider;
use wopr_test::ScriptedStep;

use common::Harness;

/// S1: two injections on the same session complete in enqueue order,
/// and the conversation log records them interleaved the same way.
#[tokio::test]
async fn test_s1_responses_and_log_preserve_enqueue_order() {
    let harness = Harness::new();
    harness.providers.register("echo", std::sync::Arc::new(EchoProvider::new("echo-model")));

    let queue_a = std::sync::Arc::clone(&harness.queue);
    let handle_a =
        tokio::spawn(async move { queue_a.inject("room", InjectPayload::new(serde_json::json!("A"), "cli")).await });
    // Give the first injection a head start into its lane so enqueue
    // order, not scheduler luck, is what's under test.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let result_b = harness.queue.inject("room", InjectPayload::new(serde_json::json!("B"), "cli")).await.unwrap();
    let result_a = handle_a.await.unwrap().unwrap();

    assert_eq!(result_a.response, "A");
    assert_eq!(result_b.response, "B");

    let entries = harness.log.read("room", None).unwrap();
    let contents: Vec<&str> = entries.iter().map(|entry| entry.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "A", "B", "B"]);
}

/// S2: cancelling the active entry rejects it with a cancel marker
/// within the window, and a subsequent injection on the same session
/// still completes normally afterward.
#[tokio::test]
async fn test_s2_cancel_active_rejects_in_flight_entry_then_session_recovers() {
    let harness = Harness::new();
    harness
        .providers
        .register("slow", std::sync::Arc::new(ScriptedProvider::new("slow", vec![ScriptedStep::Hang])));
    harness
        .sessions
        .set_provider("room", &wopr_sessions::ProviderSelection::new("slow"))
        .await
        .unwrap();

    let queue = std::sync::Arc::clone(&harness.queue);
    let handle =
        tokio::spawn(
            async move { queue.inject("room", InjectPayload::new(serde_json::json!("slow"), "cli")).await },
        );

    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = std::time::Instant::now();
    harness.queue.cancel_active("room").await;

    let result = tokio::time::timeout(Duration::from_millis(200), handle).await.unwrap().unwrap();
    assert!(matches!(result, Err(wopr_queue::QueueError::Cancelled)));
    assert!(started.elapsed() < Duration::from_millis(200));

    // A fresh provider for the follow-up injection, since the scripted
    // "slow" one has no steps left and would only serve a trivial Done.
    harness.providers.register("echo", std::sync::Arc::new(EchoProvider::new("echo-model")));
    harness.sessions.set_provider("room", &wopr_sessions::ProviderSelection::new("echo")).await.unwrap();

    let result = harness.queue.inject("room", InjectPayload::new(serde_json::json!("next"), "cli")).await.unwrap();
    assert_eq!(result.response, "next");
}
