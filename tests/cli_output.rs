//! CLI output formatting tests.
//!
//! JSON output must round-trip the models; pretty output is a titled,
//! divided block of aligned fields.

use apify_client::output::PrettyPrint;
use apify_client::{Dataset, RequestQueue, Webhook, WebhookDispatch};

fn make_test_dataset() -> Dataset {
    serde_json::from_value(serde_json::json!({
        "id": "WkzbQMuFYuamGv3YF",
        "name": "products",
        "createdAt": "2019-12-12T07:34:14.202Z",
        "itemCount": 7,
        "cleanItemCount": 5,
        "fields": ["sku"]
    }))
    .unwrap()
}

#[test]
fn test_json_output_preserves_unknown_fields() {
    let dataset = make_test_dataset();
    let json_output = serde_json::to_string_pretty(&dataset).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert_eq!(parsed["name"], "products");
    assert_eq!(parsed["itemCount"], 7);
    assert_eq!(parsed["fields"][0], "sku");
}

#[test]
fn test_dataset_pretty_print() {
    let output = make_test_dataset().pretty_print();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], "Dataset: WkzbQMuFYuamGv3YF");
    assert!(lines[1].chars().all(|c| c == '─'));
    assert!(output.contains("Name:           products"));
    assert!(output.contains("Created:        2019-12-12 07:34:14 UTC"));
    assert!(output.contains("Items:          7 (5 clean)"));
}

#[test]
fn test_request_queue_pretty_print_counts() {
    let queue: RequestQueue = serde_json::from_value(serde_json::json!({
        "id": "q1",
        "totalRequestCount": 10,
        "handledRequestCount": 4,
        "pendingRequestCount": 6,
        "hadMultipleClients": true
    }))
    .unwrap();

    let output = queue.pretty_print();
    assert!(output.contains("Requests:       10 total, 4 handled, 6 pending"));
    assert!(output.contains("Clients:        multiple"));
}

#[test]
fn test_webhook_and_dispatch_pretty_print() {
    let webhook: Webhook = serde_json::from_value(serde_json::json!({
        "id": "wh1",
        "eventTypes": ["ACTOR.RUN.SUCCEEDED", "ACTOR.RUN.FAILED"],
        "condition": {"actorRunId": "run1"},
        "isAdHoc": true
    }))
    .unwrap();
    let output = webhook.pretty_print();
    assert!(output.contains("Events:         ACTOR.RUN.SUCCEEDED, ACTOR.RUN.FAILED"));
    assert!(output.contains("Actor Run:      run1"));
    assert!(output.contains("Ad hoc:         yes"));

    let dispatch: WebhookDispatch = serde_json::from_value(serde_json::json!({
        "id": "d1",
        "webhookId": "wh1",
        "status": "FAILED",
        "calls": [{"responseStatus": 500}]
    }))
    .unwrap();
    let output = dispatch.pretty_print();
    assert!(output.starts_with("Webhook dispatch: d1"));
    assert!(output.contains("Status:         FAILED"));
    assert!(output.contains("Calls:          1"));
}
