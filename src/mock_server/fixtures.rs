//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::{
    Dataset, KeyValueStore, Request, RequestQueue, Webhook, WebhookCondition, WebhookDispatch,
    WebhookEventType,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

fn created_at() -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2019, 12, 12, 7, 34, 14).single()
}

impl Fixtures {
    // =========================================================================
    // Storage Fixtures
    // =========================================================================

    /// Create an empty dataset.
    pub fn dataset(id: &str, name: Option<&str>) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: created_at(),
            modified_at: created_at(),
            accessed_at: created_at(),
            item_count: Some(0),
            clean_item_count: Some(0),
            act_id: None,
            act_run_id: None,
            extra: Map::new(),
        }
    }

    /// Create `count` numbered product items.
    pub fn product_items(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({"sku": format!("SKU-{i:04}"), "price": i * 10, "#debug": i}))
            .collect()
    }

    /// Create an empty key-value store.
    pub fn key_value_store(id: &str, name: Option<&str>) -> KeyValueStore {
        KeyValueStore {
            id: id.to_string(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: created_at(),
            modified_at: created_at(),
            accessed_at: created_at(),
            act_id: None,
            act_run_id: None,
            extra: Map::new(),
        }
    }

    /// Create an empty request queue.
    pub fn request_queue(id: &str, name: Option<&str>) -> RequestQueue {
        RequestQueue {
            id: id.to_string(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: created_at(),
            modified_at: created_at(),
            accessed_at: created_at(),
            total_request_count: Some(0),
            handled_request_count: Some(0),
            pending_request_count: Some(0),
            had_multiple_clients: Some(false),
            extra: Map::new(),
        }
    }

    // =========================================================================
    // Webhook Fixtures
    // =========================================================================

    /// Create a webhook firing on successful runs of an actor.
    pub fn webhook(id: &str, actor_id: &str) -> Webhook {
        Webhook {
            id: id.to_string(),
            user_id: Some("mockUser".to_string()),
            created_at: created_at(),
            modified_at: created_at(),
            event_types: vec![WebhookEventType::ActorRunSucceeded],
            condition: WebhookCondition {
                actor_id: Some(actor_id.to_string()),
                ..Default::default()
            },
            request_url: Some("https://example.com/hook".to_string()),
            payload_template: None,
            ignore_ssl_errors: Some(false),
            do_not_retry: Some(false),
            is_ad_hoc: Some(false),
            last_dispatch: None,
            extra: Map::new(),
        }
    }

    /// Create a successful dispatch of a webhook.
    pub fn dispatch(id: &str, webhook_id: &str) -> WebhookDispatch {
        WebhookDispatch {
            id: id.to_string(),
            user_id: Some("mockUser".to_string()),
            webhook_id: Some(webhook_id.to_string()),
            created_at: created_at(),
            status: Some("SUCCEEDED".to_string()),
            event_type: Some(WebhookEventType::ActorRunSucceeded),
            event_data: Some(json!({"actorRunId": "mockRun"})),
            calls: Vec::new(),
            extra: Map::new(),
        }
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default test scenario with related entities.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario with related entities.
pub struct DefaultScenario {
    pub datasets: Vec<(Dataset, Vec<Value>)>,
    pub key_value_stores: Vec<KeyValueStore>,
    pub records: Vec<(String, String, Vec<u8>, String)>,
    pub request_queues: Vec<(RequestQueue, Vec<Request>)>,
    pub logs: Vec<(String, String)>,
    pub webhooks: Vec<Webhook>,
    pub dispatches: Vec<WebhookDispatch>,
}

impl DefaultScenario {
    fn new() -> Self {
        let datasets = vec![(
            Fixtures::dataset("datasetProducts", Some("products")),
            Fixtures::product_items(25),
        )];

        let key_value_stores = vec![Fixtures::key_value_store("storeDefault", Some("default"))];
        let records = vec![
            (
                "storeDefault".to_string(),
                "INPUT".to_string(),
                br#"{"startUrls":["https://example.com"]}"#.to_vec(),
                "application/json; charset=utf-8".to_string(),
            ),
            (
                "storeDefault".to_string(),
                "README".to_string(),
                b"hello".to_vec(),
                "text/plain".to_string(),
            ),
        ];

        let request_queues = vec![(
            Fixtures::request_queue("queueDefault", Some("crawl")),
            vec![
                Request::new("https://example.com"),
                Request::new("https://example.com/about"),
            ],
        )];

        let logs = vec![(
            "runDefault".to_string(),
            "2019-12-12T07:34:14.202Z ACTOR: Pulling image\n2019-12-12T07:34:15.000Z Done\n"
                .to_string(),
        )];

        let webhooks = vec![Fixtures::webhook("webhookDefault", "actorDefault")];
        let dispatches = vec![Fixtures::dispatch("dispatchDefault", "webhookDefault")];

        Self {
            datasets,
            key_value_stores,
            records,
            request_queues,
            logs,
            webhooks,
            dispatches,
        }
    }
}
