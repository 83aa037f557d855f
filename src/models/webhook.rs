//! Webhook and webhook dispatch models and sub-clients.
//!
//! A webhook subscribes a URL to actor events; every triggered invocation
//! is recorded as a dispatch.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::client::ApifyClient;
use crate::error::{catch_not_found, Result};
use crate::pagination::ListQuery;
use crate::resource::{ResourceClient, ResourceCollectionClient};
use crate::traits::{Collection, Create, Delete, Get, List, Resource, Update};

/// Event that triggers a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    /// An actor run was created.
    #[serde(rename = "ACTOR.RUN.CREATED")]
    ActorRunCreated,
    /// An actor run finished successfully.
    #[serde(rename = "ACTOR.RUN.SUCCEEDED")]
    ActorRunSucceeded,
    /// An actor run failed.
    #[serde(rename = "ACTOR.RUN.FAILED")]
    ActorRunFailed,
    /// An actor run timed out.
    #[serde(rename = "ACTOR.RUN.TIMED_OUT")]
    ActorRunTimedOut,
    /// An actor run was aborted.
    #[serde(rename = "ACTOR.RUN.ABORTED")]
    ActorRunAborted,
    /// A finished actor run was resurrected.
    #[serde(rename = "ACTOR.RUN.RESURRECTED")]
    ActorRunResurrected,
    /// An actor build was created.
    #[serde(rename = "ACTOR.BUILD.CREATED")]
    ActorBuildCreated,
    /// An actor build finished successfully.
    #[serde(rename = "ACTOR.BUILD.SUCCEEDED")]
    ActorBuildSucceeded,
    /// An actor build failed.
    #[serde(rename = "ACTOR.BUILD.FAILED")]
    ActorBuildFailed,
    /// An actor build timed out.
    #[serde(rename = "ACTOR.BUILD.TIMED_OUT")]
    ActorBuildTimedOut,
    /// An actor build was aborted.
    #[serde(rename = "ACTOR.BUILD.ABORTED")]
    ActorBuildAborted,
    /// Unknown event type.
    #[serde(other)]
    Unknown,
}

/// What a webhook listens to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCondition {
    /// Runs of this actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Runs of this actor task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_task_id: Option<String>,
    /// This single run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_run_id: Option<String>,
}

/// A webhook on the Apify platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Webhook ID.
    pub id: String,

    /// Owner of the webhook.
    #[serde(default)]
    pub user_id: Option<String>,

    /// When the webhook was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the webhook was last modified.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// Events that trigger the webhook.
    #[serde(default)]
    pub event_types: Vec<WebhookEventType>,

    /// What the webhook listens to.
    #[serde(default)]
    pub condition: WebhookCondition,

    /// URL invoked when the webhook triggers.
    #[serde(default)]
    pub request_url: Option<String>,

    /// Template for the payload sent to `request_url`.
    #[serde(default)]
    pub payload_template: Option<String>,

    /// Whether SSL errors of `request_url` are ignored.
    #[serde(default)]
    pub ignore_ssl_errors: Option<bool>,

    /// Whether failed invocations are not retried.
    #[serde(default)]
    pub do_not_retry: Option<bool>,

    /// Whether the webhook triggers only once.
    #[serde(default)]
    pub is_ad_hoc: Option<bool>,

    /// The most recent dispatch, if any.
    #[serde(default)]
    pub last_dispatch: Option<Value>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Webhook fields sent on create and update.
///
/// Unset fields are not sent, so an update only touches what is set. The
/// condition is taken from the actor run, actor task or actor, in that
/// order of priority; a run condition makes the webhook ad hoc unless
/// [`is_ad_hoc`](Self::is_ad_hoc) says otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookRepresentation {
    event_types: Option<Vec<WebhookEventType>>,
    request_url: Option<String>,
    payload_template: Option<String>,
    actor_id: Option<String>,
    actor_task_id: Option<String>,
    actor_run_id: Option<String>,
    ignore_ssl_errors: Option<bool>,
    do_not_retry: Option<bool>,
    idempotency_key: Option<String>,
    is_ad_hoc: Option<bool>,
}

impl WebhookRepresentation {
    /// An empty representation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events that trigger the webhook.
    #[must_use]
    pub fn event_types(mut self, event_types: impl IntoIterator<Item = WebhookEventType>) -> Self {
        self.event_types = Some(event_types.into_iter().collect());
        self
    }

    /// URL invoked when the webhook triggers.
    #[must_use]
    pub fn request_url(mut self, url: impl Into<String>) -> Self {
        self.request_url = Some(url.into());
        self
    }

    /// Template for the payload sent to the request URL.
    #[must_use]
    pub fn payload_template(mut self, template: impl Into<String>) -> Self {
        self.payload_template = Some(template.into());
        self
    }

    /// Listen to runs of an actor.
    #[must_use]
    pub fn actor_id(mut self, id: impl Into<String>) -> Self {
        self.actor_id = Some(id.into());
        self
    }

    /// Listen to runs of an actor task.
    #[must_use]
    pub fn actor_task_id(mut self, id: impl Into<String>) -> Self {
        self.actor_task_id = Some(id.into());
        self
    }

    /// Listen to a single actor run.
    #[must_use]
    pub fn actor_run_id(mut self, id: impl Into<String>) -> Self {
        self.actor_run_id = Some(id.into());
        self
    }

    /// Ignore SSL errors of the request URL.
    #[must_use]
    pub fn ignore_ssl_errors(mut self, ignore: bool) -> Self {
        self.ignore_ssl_errors = Some(ignore);
        self
    }

    /// Do not retry failed invocations.
    #[must_use]
    pub fn do_not_retry(mut self, do_not_retry: bool) -> Self {
        self.do_not_retry = Some(do_not_retry);
        self
    }

    /// Key making repeated creation requests idempotent.
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Trigger the webhook only once.
    #[must_use]
    pub fn is_ad_hoc(mut self, is_ad_hoc: bool) -> Self {
        self.is_ad_hoc = Some(is_ad_hoc);
        self
    }

    fn condition(&self) -> Option<WebhookCondition> {
        if let Some(run) = &self.actor_run_id {
            Some(WebhookCondition {
                actor_run_id: Some(run.clone()),
                ..Default::default()
            })
        } else if let Some(task) = &self.actor_task_id {
            Some(WebhookCondition {
                actor_task_id: Some(task.clone()),
                ..Default::default()
            })
        } else {
            self.actor_id.as_ref().map(|actor| WebhookCondition {
                actor_id: Some(actor.clone()),
                ..Default::default()
            })
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_types: Option<&'a [WebhookEventType]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<WebhookCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_ssl_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    do_not_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_ad_hoc: Option<bool>,
}

impl Serialize for WebhookRepresentation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let run_condition = self.actor_run_id.is_some().then_some(true);
        WebhookBody {
            event_types: self.event_types.as_deref(),
            request_url: self.request_url.as_deref(),
            payload_template: self.payload_template.as_deref(),
            condition: self.condition(),
            ignore_ssl_errors: self.ignore_ssl_errors,
            do_not_retry: self.do_not_retry,
            idempotency_key: self.idempotency_key.as_deref(),
            is_ad_hoc: self.is_ad_hoc.or(run_condition),
        }
        .serialize(serializer)
    }
}

/// One HTTP call made for a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDispatchCall {
    /// When the call started.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the call finished.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Error, if the call failed.
    #[serde(default)]
    pub error_message: Option<String>,
    /// HTTP status returned by the request URL.
    #[serde(default)]
    pub response_status: Option<u16>,
    /// Body returned by the request URL.
    #[serde(default)]
    pub response_body: Option<String>,
}

/// A triggered invocation of a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDispatch {
    /// Dispatch ID.
    pub id: String,

    /// Owner of the webhook.
    #[serde(default)]
    pub user_id: Option<String>,

    /// The webhook that was triggered.
    #[serde(default)]
    pub webhook_id: Option<String>,

    /// When the dispatch was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Dispatch status (`ACTIVE`, `SUCCEEDED`, `FAILED`).
    #[serde(default)]
    pub status: Option<String>,

    /// Event that triggered the dispatch.
    #[serde(default)]
    pub event_type: Option<WebhookEventType>,

    /// Data describing the event.
    #[serde(default)]
    pub event_data: Option<Value>,

    /// HTTP calls made so far.
    #[serde(default)]
    pub calls: Vec<WebhookDispatchCall>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client for a single webhook.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    resource: ResourceClient,
}

impl WebhookClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    /// The webhook ID this client addresses.
    pub fn id(&self) -> &str {
        self.resource.id()
    }

    /// Trigger the webhook with a dummy payload.
    ///
    /// Returns the resulting dispatch, or `None` when the webhook does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    #[tracing::instrument(skip(self), fields(webhook = %self.resource.id()))]
    pub async fn test(&self) -> Result<Option<WebhookDispatch>> {
        let result = async {
            let builder = self.resource.request(Method::POST, Some("test"))?;
            let response = self.resource.send(builder).await?;
            ApifyClient::data(response).await
        }
        .await;
        catch_not_found(result)
    }

    /// Dispatches of this webhook.
    pub fn dispatches(&self) -> WebhookDispatchCollectionClient {
        WebhookDispatchCollectionClient::new(ResourceCollectionClient::new(
            self.resource.http().clone(),
            self.resource.path(),
            "dispatches",
        ))
    }
}

impl Resource for WebhookClient {
    type Model = Webhook;

    fn resource(&self) -> &ResourceClient {
        &self.resource
    }
}

impl Get for WebhookClient {}

impl Update for WebhookClient {
    type Params = WebhookRepresentation;
}

impl Delete for WebhookClient {}

/// Client for the webhook collection.
#[derive(Debug, Clone)]
pub struct WebhookCollectionClient {
    collection: ResourceCollectionClient,
}

impl WebhookCollectionClient {
    pub(crate) fn new(collection: ResourceCollectionClient) -> Self {
        Self { collection }
    }
}

impl Collection for WebhookCollectionClient {
    type Model = Webhook;

    fn collection(&self) -> &ResourceCollectionClient {
        &self.collection
    }
}

impl List for WebhookCollectionClient {
    type Query = ListQuery;

    fn window(offset: u64, limit: u64) -> Self::Query {
        ListQuery::window(offset, limit)
    }
}

impl Create for WebhookCollectionClient {
    type Params = WebhookRepresentation;
}

/// Client for a single webhook dispatch.
#[derive(Debug, Clone)]
pub struct WebhookDispatchClient {
    resource: ResourceClient,
}

impl WebhookDispatchClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }
}

impl Resource for WebhookDispatchClient {
    type Model = WebhookDispatch;

    fn resource(&self) -> &ResourceClient {
        &self.resource
    }
}

impl Get for WebhookDispatchClient {}

/// Client for a collection of webhook dispatches.
#[derive(Debug, Clone)]
pub struct WebhookDispatchCollectionClient {
    collection: ResourceCollectionClient,
}

impl WebhookDispatchCollectionClient {
    pub(crate) fn new(collection: ResourceCollectionClient) -> Self {
        Self { collection }
    }
}

impl Collection for WebhookDispatchCollectionClient {
    type Model = WebhookDispatch;

    fn collection(&self) -> &ResourceCollectionClient {
        &self.collection
    }
}

impl List for WebhookDispatchCollectionClient {
    type Query = ListQuery;

    fn window(offset: u64, limit: u64) -> Self::Query {
        ListQuery::window(offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_representation_sends_nothing() {
        let body = serde_json::to_value(WebhookRepresentation::new()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_representation_with_actor_condition() {
        let webhook = WebhookRepresentation::new()
            .event_types([WebhookEventType::ActorRunSucceeded])
            .request_url("https://example.com/hook")
            .actor_id("actor-1")
            .ignore_ssl_errors(true);

        let body = serde_json::to_value(&webhook).unwrap();
        assert_eq!(
            body,
            json!({
                "eventTypes": ["ACTOR.RUN.SUCCEEDED"],
                "requestUrl": "https://example.com/hook",
                "condition": {"actorId": "actor-1"},
                "ignoreSslErrors": true
            })
        );
    }

    #[test]
    fn test_run_condition_wins_and_is_ad_hoc() {
        let webhook = WebhookRepresentation::new()
            .actor_id("actor-1")
            .actor_task_id("task-1")
            .actor_run_id("run-1");

        let body = serde_json::to_value(&webhook).unwrap();
        assert_eq!(body["condition"], json!({"actorRunId": "run-1"}));
        assert_eq!(body["isAdHoc"], true);
    }

    #[test]
    fn test_task_condition_beats_actor() {
        let webhook = WebhookRepresentation::new()
            .actor_id("actor-1")
            .actor_task_id("task-1");

        let body = serde_json::to_value(&webhook).unwrap();
        assert_eq!(body["condition"], json!({"actorTaskId": "task-1"}));
        assert!(body.get("isAdHoc").is_none());
    }

    #[test]
    fn test_explicit_ad_hoc_overrides_run_default() {
        let webhook = WebhookRepresentation::new()
            .actor_run_id("run-1")
            .is_ad_hoc(false);

        let body = serde_json::to_value(&webhook).unwrap();
        assert_eq!(body["isAdHoc"], false);
    }

    #[test]
    fn test_webhook_deserialize() {
        let webhook: Webhook = serde_json::from_value(json!({
            "id": "YiKoxjkaS9gjGTqhF",
            "createdAt": "2019-12-12T07:34:14.202Z",
            "modifiedAt": "2019-12-13T08:36:13.202Z",
            "userId": "wRsJZtadYvn4mBZmm",
            "isAdHoc": false,
            "eventTypes": ["ACTOR.RUN.SUCCEEDED", "SOMETHING.NEW"],
            "condition": {"actorId": "hksJZtadYvn4mBuin"},
            "ignoreSslErrors": false,
            "doNotRetry": false,
            "requestUrl": "http://example.com/",
            "payloadTemplate": "{\"userId\": {{userId}}}",
            "lastDispatch": {"status": "SUCCEEDED", "finishedAt": "2019-12-13T08:36:13.202Z"},
            "stats": {"totalDispatches": 1}
        }))
        .unwrap();

        assert_eq!(webhook.id, "YiKoxjkaS9gjGTqhF");
        assert_eq!(
            webhook.event_types,
            vec![WebhookEventType::ActorRunSucceeded, WebhookEventType::Unknown]
        );
        assert_eq!(webhook.condition.actor_id.as_deref(), Some("hksJZtadYvn4mBuin"));
        assert!(webhook.extra.contains_key("stats"));
    }

    #[test]
    fn test_dispatch_deserialize() {
        let dispatch: WebhookDispatch = serde_json::from_value(json!({
            "id": "asdLZtadYvn4mBZmm",
            "userId": "wRsJZtadYvn4mBZmm",
            "webhookId": "asdLZtadYvn4mBZmm",
            "createdAt": "2019-12-12T07:34:14.202Z",
            "status": "SUCCEEDED",
            "eventType": "ACTOR.RUN.SUCCEEDED",
            "eventData": {"actorId": "vvE7iMKuMc5qTHHsR", "actorRunId": "JgwXN9BdwxGcu9MMF"},
            "calls": [{
                "startedAt": "2019-12-12T07:34:14.202Z",
                "finishedAt": "2019-12-12T07:34:14.202Z",
                "errorMessage": "Cannot send request",
                "responseStatus": 200,
                "responseBody": "{\"foo\": \"bar\"}"
            }]
        }))
        .unwrap();

        assert_eq!(dispatch.event_type, Some(WebhookEventType::ActorRunSucceeded));
        assert_eq!(dispatch.calls.len(), 1);
        assert_eq!(dispatch.calls[0].response_status, Some(200));
    }
}
