//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Apify API server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Dataset, KeyValueStore, Request, RequestQueue, Webhook, WebhookDispatch};

/// A dataset together with its items.
#[derive(Debug, Clone)]
pub struct MockDataset {
    pub info: Dataset,
    pub items: Vec<Value>,
}

/// A stored key-value record.
#[derive(Debug, Clone)]
pub struct MockRecord {
    pub value: Vec<u8>,
    pub content_type: String,
}

/// A key-value store together with its records, ordered by key.
#[derive(Debug, Clone)]
pub struct MockKeyValueStore {
    pub info: KeyValueStore,
    pub records: BTreeMap<String, MockRecord>,
}

/// A request queue together with its requests, in queue order.
#[derive(Debug, Clone)]
pub struct MockRequestQueue {
    pub info: RequestQueue,
    pub requests: Vec<Request>,
    pub client_keys: HashSet<String>,
}

/// Outcome of adding a request to a mock queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub request_id: String,
    pub was_already_present: bool,
    pub was_already_handled: bool,
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Datasets indexed by ID.
    pub datasets: HashMap<String, MockDataset>,

    /// Key-value stores indexed by ID.
    pub key_value_stores: HashMap<String, MockKeyValueStore>,

    /// Request queues indexed by ID.
    pub request_queues: HashMap<String, MockRequestQueue>,

    /// Log text indexed by build or run ID.
    pub logs: HashMap<String, String>,

    /// Webhooks indexed by ID.
    pub webhooks: HashMap<String, Webhook>,

    /// Webhook dispatches indexed by ID.
    pub dispatches: HashMap<String, WebhookDispatch>,

    next_id: u64,
}

/// Find the key of the entry addressed by `id`.
///
/// Accepts a plain ID or the `username~name` form of named storages.
fn resolve<V>(
    map: &HashMap<String, V>,
    id: &str,
    name_of: impl Fn(&V) -> Option<&str>,
) -> Option<String> {
    if map.contains_key(id) {
        return Some(id.to_string());
    }
    let (_, name) = id.split_once('~')?;
    map.iter()
        .find(|(_, entry)| name_of(entry) == Some(name))
        .map(|(key, _)| key.clone())
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Generate a fresh resource ID.
    pub fn generate_id(&mut self) -> String {
        self.next_id += 1;
        format!("mockId{:011}", self.next_id)
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Add a dataset with the given items.
    pub fn with_dataset(mut self, mut info: Dataset, items: Vec<Value>) -> Self {
        info.item_count = Some(items.len() as u64);
        self.datasets
            .insert(info.id.clone(), MockDataset { info, items });
        self
    }

    /// Add an empty key-value store.
    pub fn with_key_value_store(mut self, info: KeyValueStore) -> Self {
        self.key_value_stores.insert(
            info.id.clone(),
            MockKeyValueStore {
                info,
                records: BTreeMap::new(),
            },
        );
        self
    }

    /// Add a record to an existing key-value store.
    pub fn with_record(mut self, store_id: &str, key: &str, value: &[u8], content_type: &str) -> Self {
        if let Some(store) = self.key_value_stores.get_mut(store_id) {
            store.records.insert(
                key.to_string(),
                MockRecord {
                    value: value.to_vec(),
                    content_type: content_type.to_string(),
                },
            );
        }
        self
    }

    /// Add a request queue with the given requests.
    pub fn with_request_queue(mut self, info: RequestQueue, requests: Vec<Request>) -> Self {
        let mut queue = MockRequestQueue {
            info,
            requests: Vec::new(),
            client_keys: HashSet::new(),
        };
        for mut request in requests {
            if request.id.is_none() {
                request.id = Some(self.generate_id());
            }
            queue.requests.push(request);
        }
        refresh_queue_counts(&mut queue);
        self.request_queues.insert(queue.info.id.clone(), queue);
        self
    }

    /// Add the log of a build or run.
    pub fn with_log(mut self, id: &str, text: &str) -> Self {
        self.logs.insert(id.to_string(), text.to_string());
        self
    }

    /// Add a webhook.
    pub fn with_webhook(mut self, webhook: Webhook) -> Self {
        self.webhooks.insert(webhook.id.clone(), webhook);
        self
    }

    /// Add a webhook dispatch.
    pub fn with_dispatch(mut self, dispatch: WebhookDispatch) -> Self {
        self.dispatches.insert(dispatch.id.clone(), dispatch);
        self
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    /// Get a dataset by ID or `username~name`.
    pub fn dataset(&self, id: &str) -> Option<&MockDataset> {
        let key = resolve(&self.datasets, id, |d| d.info.name.as_deref())?;
        self.datasets.get(&key)
    }

    fn dataset_mut(&mut self, id: &str) -> Option<&mut MockDataset> {
        let key = resolve(&self.datasets, id, |d| d.info.name.as_deref())?;
        self.datasets.get_mut(&key)
    }

    /// List datasets; unnamed ones only when asked for.
    pub fn list_datasets(&self, unnamed: bool) -> Vec<Dataset> {
        let mut datasets: Vec<Dataset> = self
            .datasets
            .values()
            .filter(|d| unnamed || d.info.name.is_some())
            .map(|d| d.info.clone())
            .collect();
        datasets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        datasets
    }

    /// Get the dataset called `name`, or create it.
    pub fn get_or_create_dataset(&mut self, name: Option<&str>) -> Dataset {
        if let Some(existing) = name.and_then(|n| {
            self.datasets
                .values()
                .find(|d| d.info.name.as_deref() == Some(n))
        }) {
            return existing.info.clone();
        }
        let id = self.generate_id();
        let now = Utc::now();
        let info = Dataset {
            id: id.clone(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: Some(now),
            modified_at: Some(now),
            accessed_at: Some(now),
            item_count: Some(0),
            clean_item_count: Some(0),
            act_id: None,
            act_run_id: None,
            extra: Default::default(),
        };
        self.datasets.insert(
            id,
            MockDataset {
                info: info.clone(),
                items: Vec::new(),
            },
        );
        info
    }

    /// Rename a dataset.
    pub fn update_dataset(&mut self, id: &str, name: Option<String>) -> Option<Dataset> {
        let dataset = self.dataset_mut(id)?;
        if name.is_some() {
            dataset.info.name = name;
        }
        dataset.info.modified_at = Some(Utc::now());
        Some(dataset.info.clone())
    }

    /// Delete a dataset; false when it does not exist.
    pub fn delete_dataset(&mut self, id: &str) -> bool {
        match resolve(&self.datasets, id, |d| d.info.name.as_deref()) {
            Some(key) => self.datasets.remove(&key).is_some(),
            None => false,
        }
    }

    /// Append one item or an array of items; false when the dataset does
    /// not exist.
    pub fn push_items(&mut self, id: &str, items: Value) -> bool {
        let Some(dataset) = self.dataset_mut(id) else {
            return false;
        };
        match items {
            Value::Array(items) => dataset.items.extend(items),
            item => dataset.items.push(item),
        }
        dataset.info.item_count = Some(dataset.items.len() as u64);
        dataset.info.clean_item_count = Some(
            dataset
                .items
                .iter()
                .filter(|item| !is_empty_item(item))
                .count() as u64,
        );
        dataset.info.modified_at = Some(Utc::now());
        true
    }

    // =========================================================================
    // Key-value stores
    // =========================================================================

    /// Get a key-value store by ID or `username~name`.
    pub fn key_value_store(&self, id: &str) -> Option<&MockKeyValueStore> {
        let key = resolve(&self.key_value_stores, id, |s| s.info.name.as_deref())?;
        self.key_value_stores.get(&key)
    }

    /// Mutable access to a key-value store.
    pub fn key_value_store_mut(&mut self, id: &str) -> Option<&mut MockKeyValueStore> {
        let key = resolve(&self.key_value_stores, id, |s| s.info.name.as_deref())?;
        self.key_value_stores.get_mut(&key)
    }

    /// List key-value stores; unnamed ones only when asked for.
    pub fn list_key_value_stores(&self, unnamed: bool) -> Vec<KeyValueStore> {
        let mut stores: Vec<KeyValueStore> = self
            .key_value_stores
            .values()
            .filter(|s| unnamed || s.info.name.is_some())
            .map(|s| s.info.clone())
            .collect();
        stores.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        stores
    }

    /// Get the key-value store called `name`, or create it.
    pub fn get_or_create_key_value_store(&mut self, name: Option<&str>) -> KeyValueStore {
        if let Some(existing) = name.and_then(|n| {
            self.key_value_stores
                .values()
                .find(|s| s.info.name.as_deref() == Some(n))
        }) {
            return existing.info.clone();
        }
        let id = self.generate_id();
        let now = Utc::now();
        let info = KeyValueStore {
            id: id.clone(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: Some(now),
            modified_at: Some(now),
            accessed_at: Some(now),
            act_id: None,
            act_run_id: None,
            extra: Default::default(),
        };
        self.key_value_stores.insert(
            id,
            MockKeyValueStore {
                info: info.clone(),
                records: BTreeMap::new(),
            },
        );
        info
    }

    /// Rename a key-value store.
    pub fn update_key_value_store(&mut self, id: &str, name: Option<String>) -> Option<KeyValueStore> {
        let store = self.key_value_store_mut(id)?;
        if name.is_some() {
            store.info.name = name;
        }
        store.info.modified_at = Some(Utc::now());
        Some(store.info.clone())
    }

    /// Delete a key-value store; false when it does not exist.
    pub fn delete_key_value_store(&mut self, id: &str) -> bool {
        match resolve(&self.key_value_stores, id, |s| s.info.name.as_deref()) {
            Some(key) => self.key_value_stores.remove(&key).is_some(),
            None => false,
        }
    }

    // =========================================================================
    // Request queues
    // =========================================================================

    /// Get a request queue by ID or `username~name`.
    pub fn request_queue(&self, id: &str) -> Option<&MockRequestQueue> {
        let key = resolve(&self.request_queues, id, |q| q.info.name.as_deref())?;
        self.request_queues.get(&key)
    }

    /// Mutable access to a request queue.
    pub fn request_queue_mut(&mut self, id: &str) -> Option<&mut MockRequestQueue> {
        let key = resolve(&self.request_queues, id, |q| q.info.name.as_deref())?;
        self.request_queues.get_mut(&key)
    }

    /// List request queues; unnamed ones only when asked for.
    pub fn list_request_queues(&self, unnamed: bool) -> Vec<RequestQueue> {
        let mut queues: Vec<RequestQueue> = self
            .request_queues
            .values()
            .filter(|q| unnamed || q.info.name.is_some())
            .map(|q| q.info.clone())
            .collect();
        queues.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        queues
    }

    /// Get the request queue called `name`, or create it.
    pub fn get_or_create_request_queue(&mut self, name: Option<&str>) -> RequestQueue {
        if let Some(existing) = name.and_then(|n| {
            self.request_queues
                .values()
                .find(|q| q.info.name.as_deref() == Some(n))
        }) {
            return existing.info.clone();
        }
        let id = self.generate_id();
        let now = Utc::now();
        let info = RequestQueue {
            id: id.clone(),
            name: name.map(str::to_string),
            user_id: Some("mockUser".to_string()),
            created_at: Some(now),
            modified_at: Some(now),
            accessed_at: Some(now),
            total_request_count: Some(0),
            handled_request_count: Some(0),
            pending_request_count: Some(0),
            had_multiple_clients: Some(false),
            extra: Default::default(),
        };
        self.request_queues.insert(
            id,
            MockRequestQueue {
                info: info.clone(),
                requests: Vec::new(),
                client_keys: HashSet::new(),
            },
        );
        info
    }

    /// Rename a request queue.
    pub fn update_request_queue(&mut self, id: &str, name: Option<String>) -> Option<RequestQueue> {
        let queue = self.request_queue_mut(id)?;
        if name.is_some() {
            queue.info.name = name;
        }
        queue.info.modified_at = Some(Utc::now());
        Some(queue.info.clone())
    }

    /// Delete a request queue; false when it does not exist.
    pub fn delete_request_queue(&mut self, id: &str) -> bool {
        match resolve(&self.request_queues, id, |q| q.info.name.as_deref()) {
            Some(key) => self.request_queues.remove(&key).is_some(),
            None => false,
        }
    }

    /// Add a request, deduplicated by unique key.
    ///
    /// Returns `None` when the queue does not exist.
    pub fn add_request(
        &mut self,
        queue_id: &str,
        mut request: Request,
        forefront: bool,
        client_key: Option<&str>,
    ) -> Option<AddOutcome> {
        let new_id = self.generate_id();
        let queue = self.request_queue_mut(queue_id)?;
        track_client(queue, client_key);

        let unique_key = request
            .unique_key
            .clone()
            .unwrap_or_else(|| request.url.clone());
        if let Some(existing) = queue
            .requests
            .iter()
            .find(|r| r.unique_key.as_deref() == Some(unique_key.as_str()))
        {
            return Some(AddOutcome {
                request_id: existing.id.clone().unwrap_or_default(),
                was_already_present: true,
                was_already_handled: existing.handled_at.is_some(),
            });
        }

        request.id = Some(new_id.clone());
        request.unique_key = Some(unique_key);
        if forefront {
            queue.requests.insert(0, request);
        } else {
            queue.requests.push(request);
        }
        refresh_queue_counts(queue);

        Some(AddOutcome {
            request_id: new_id,
            was_already_present: false,
            was_already_handled: false,
        })
    }

    /// Replace a stored request; `None` when the queue or request is missing.
    pub fn update_request(
        &mut self,
        queue_id: &str,
        request_id: &str,
        mut request: Request,
        forefront: bool,
        client_key: Option<&str>,
    ) -> Option<AddOutcome> {
        let queue = self.request_queue_mut(queue_id)?;
        track_client(queue, client_key);

        let position = queue
            .requests
            .iter()
            .position(|r| r.id.as_deref() == Some(request_id))?;
        let previous = queue.requests.remove(position);
        request.id = previous.id;
        if request.unique_key.is_none() {
            request.unique_key = previous.unique_key;
        }
        let was_already_handled = previous.handled_at.is_some();
        if forefront {
            queue.requests.insert(0, request);
        } else {
            queue.requests.insert(position, request);
        }
        refresh_queue_counts(queue);

        Some(AddOutcome {
            request_id: request_id.to_string(),
            was_already_present: true,
            was_already_handled,
        })
    }

    /// Remove a request; false when the queue or request is missing.
    pub fn delete_request(&mut self, queue_id: &str, request_id: &str) -> bool {
        let Some(queue) = self.request_queue_mut(queue_id) else {
            return false;
        };
        let before = queue.requests.len();
        queue
            .requests
            .retain(|r| r.id.as_deref() != Some(request_id));
        let removed = queue.requests.len() != before;
        refresh_queue_counts(queue);
        removed
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// List webhooks by creation time.
    pub fn list_webhooks(&self) -> Vec<Webhook> {
        let mut webhooks: Vec<Webhook> = self.webhooks.values().cloned().collect();
        webhooks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        webhooks
    }

    /// List dispatches by creation time, optionally for one webhook only.
    pub fn list_dispatches(&self, webhook_id: Option<&str>) -> Vec<WebhookDispatch> {
        let mut dispatches: Vec<WebhookDispatch> = self
            .dispatches
            .values()
            .filter(|d| webhook_id.map_or(true, |id| d.webhook_id.as_deref() == Some(id)))
            .cloned()
            .collect();
        dispatches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        dispatches
    }
}

/// An item with no fields, as skipped by `skipEmpty`.
pub fn is_empty_item(item: &Value) -> bool {
    match item {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn track_client(queue: &mut MockRequestQueue, client_key: Option<&str>) {
    if let Some(key) = client_key {
        queue.client_keys.insert(key.to_string());
    }
    queue.info.had_multiple_clients = Some(queue.client_keys.len() > 1);
}

fn refresh_queue_counts(queue: &mut MockRequestQueue) {
    let total = queue.requests.len() as u64;
    let handled = queue
        .requests
        .iter()
        .filter(|r| r.handled_at.is_some())
        .count() as u64;
    queue.info.total_request_count = Some(total);
    queue.info.handled_request_count = Some(handled);
    queue.info.pending_request_count = Some(total - handled);
    queue.info.modified_at = Some(Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use serde_json::json;

    #[test]
    fn test_resolve_by_tilde_name() {
        let state = MockState::new().with_dataset(Fixtures::dataset("ds1", Some("products")), vec![]);
        assert!(state.dataset("ds1").is_some());
        assert!(state.dataset("someone~products").is_some());
        assert!(state.dataset("someone~other").is_none());
    }

    #[test]
    fn test_push_items_updates_counts() {
        let mut state = MockState::new().with_dataset(Fixtures::dataset("ds1", None), vec![]);
        assert!(state.push_items("ds1", json!([{"a": 1}, {}])));
        assert!(state.push_items("ds1", json!({"b": 2})));
        assert!(!state.push_items("missing", json!({})));

        let dataset = state.dataset("ds1").unwrap();
        assert_eq!(dataset.info.item_count, Some(3));
        assert_eq!(dataset.info.clean_item_count, Some(2));
    }

    #[test]
    fn test_add_request_deduplicates_and_orders() {
        let mut state =
            MockState::new().with_request_queue(Fixtures::request_queue("q1", None), vec![]);

        let first = state
            .add_request("q1", Request::new("https://a.example"), false, Some("c1"))
            .unwrap();
        assert!(!first.was_already_present);

        let again = state
            .add_request("q1", Request::new("https://a.example"), false, Some("c2"))
            .unwrap();
        assert!(again.was_already_present);
        assert_eq!(again.request_id, first.request_id);

        state
            .add_request("q1", Request::new("https://b.example"), true, None)
            .unwrap();

        let queue = state.request_queue("q1").unwrap();
        assert_eq!(queue.requests[0].url, "https://b.example");
        assert_eq!(queue.info.total_request_count, Some(2));
        assert_eq!(queue.info.had_multiple_clients, Some(true));
    }

    #[test]
    fn test_get_or_create_reuses_named() {
        let mut state = MockState::new();
        let a = state.get_or_create_key_value_store(Some("cache"));
        let b = state.get_or_create_key_value_store(Some("cache"));
        let c = state.get_or_create_key_value_store(None);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(state.list_key_value_stores(false).len(), 1);
        assert_eq!(state.list_key_value_stores(true).len(), 2);
    }
}
