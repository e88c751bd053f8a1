//! S3 (middleware block) from spec.md §8.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use wopr_hooks::{HookError, HookOutcome, Middleware, MiddlewareContext};
use wopr_llm::EchoProvider;
use wopr_queue::InjectPayload;
use wopr_sessions::EntryKind;

use common::Harness;

/// Blocks any incoming message containing the substring `"NO"`.
struct NoBlocker;

#[async_trait]
impl Middleware for NoBlocker {
    fn name(&self) -> &str {
        "no-blocker"
    }

    async fn on_incoming(&self, _ctx: &MiddlewareContext, message: String) -> Result<HookOutcome, HookError> {
        if message.contains("NO") {
            Ok(HookOutcome::prevent())
        } else {
            Ok(HookOutcome::unchanged(message))
        }
    }
}

#[tokio::test]
async fn test_s3_incoming_middleware_block_short_circuits_before_the_provider() {
    let harness = Harness::new();
    harness.providers.register("echo", Arc::new(EchoProvider::new("echo-model")));
    harness.middleware.register(Arc::new(NoBlocker), 10);

    let result = harness
        .queue
        .inject("alice", InjectPayload::new(serde_json::json!("please NO"), "cli"))
        .await
        .unwrap();

    assert_eq!(result.response, "");

    let entries = harness.log.read("alice", None).unwrap();
    assert!(entries
        .iter()
        .any(|entry| entry.kind == EntryKind::Context && entry.content == "Message blocked by hook."));
    // The message was never logged as a `Message` entry and the
    // provider never saw it: only the blocked-by notice was recorded.
    assert!(!entries.iter().any(|entry| entry.kind == EntryKind::Message));
    assert!(!entries.iter().any(|entry| entry.kind == EntryKind::Response));
}
