//! S6 (WS topic fan-out) from spec.md §8.

use uuid::Uuid;
use wopr_events::Topic;
use wopr_gateway::ws::WsHub;

/// Two clients, `C1` subscribed to `instance:a:status` and `C2` to
/// `instance:b`; publishing `instance:a:status` and `instance:b:logs`
/// delivers exactly one message to each client.
#[tokio::test]
async fn test_s6_clients_receive_only_their_matching_topic() {
    let hub = WsHub::new();

    let c1 = Uuid::new_v4();
    let (tx1, mut rx1) = tokio::sync::mpsc::channel(8);
    hub.register(c1, tx1, 0);
    hub.subscribe(c1, vec!["instance:a:status".to_string()]);

    let c2 = Uuid::new_v4();
    let (tx2, mut rx2) = tokio::sync::mpsc::channel(8);
    hub.register(c2, tx2, 0);
    hub.subscribe(c2, vec!["instance:b".to_string()]);

    hub.fan_out(&Topic::instance_scoped("a", "status"), "a-status-payload");
    hub.fan_out(&Topic::instance_scoped("b", "logs"), "b-logs-payload");

    assert_eq!(rx1.try_recv().unwrap(), "a-status-payload");
    assert!(rx1.try_recv().is_err(), "C1 must not see the instance:b:logs publish");

    assert_eq!(rx2.try_recv().unwrap(), "b-logs-payload");
    assert!(rx2.try_recv().is_err(), "C2 must not see the instance:a:status publish");
}
