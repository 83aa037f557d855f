//! Request queue model and sub-clients.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApifyClient;
use crate::error::{catch_not_found, ApifyError, Result};
use crate::pagination::StorageListQuery;
use crate::params;
use crate::resource::{encode_segment, ResourceClient, ResourceCollectionClient};
use crate::traits::{Collection, Delete, Get, GetOrCreate, List, Resource, Update};

/// A request queue on the Apify platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQueue {
    /// Queue ID.
    pub id: String,

    /// Queue name; unnamed queues have none.
    #[serde(default)]
    pub name: Option<String>,

    /// Owner of the queue.
    #[serde(default)]
    pub user_id: Option<String>,

    /// When the queue was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the queue was last modified.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// When the queue was last accessed.
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,

    /// Requests ever added.
    #[serde(default)]
    pub total_request_count: Option<u64>,

    /// Requests marked as handled.
    #[serde(default)]
    pub handled_request_count: Option<u64>,

    /// Requests waiting to be handled.
    #[serde(default)]
    pub pending_request_count: Option<u64>,

    /// Whether more than one client has written to the queue.
    #[serde(default)]
    pub had_multiple_clients: Option<bool>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields of a request queue that can be changed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQueueUpdate {
    /// New queue name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A crawl request stored in a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request ID, assigned by the queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Deduplication key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,

    /// URL to crawl.
    pub url: String,

    /// HTTP method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// How many times the request was retried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,

    /// When the request was handled; unset while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_at: Option<DateTime<Utc>>,

    /// Fields not covered above (`userData`, `headers`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Request {
    /// A request for `url`, deduplicated by the URL itself.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: None,
            unique_key: Some(url.clone()),
            url,
            method: None,
            retry_count: None,
            handled_at: None,
            extra: Map::new(),
        }
    }
}

/// The first requests of a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueHead {
    /// Requested number of entries.
    #[serde(default)]
    pub limit: Option<u64>,

    /// When the queue was last modified.
    #[serde(default)]
    pub queue_modified_at: Option<DateTime<Utc>>,

    /// Whether more than one client has written to the queue.
    #[serde(default)]
    pub had_multiple_clients: Option<bool>,

    /// The pending requests, in queue order.
    #[serde(default)]
    pub items: Vec<Request>,
}

/// Outcome of adding or updating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueOperationInfo {
    /// ID of the affected request.
    pub request_id: String,
    /// Whether a request with the same unique key already existed.
    #[serde(default)]
    pub was_already_present: bool,
    /// Whether that request was already handled.
    #[serde(default)]
    pub was_already_handled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    forefront: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_key: Option<&'a str>,
}

/// Client for a single request queue.
#[derive(Debug, Clone)]
pub struct RequestQueueClient {
    resource: ResourceClient,
    client_key: Option<String>,
}

impl RequestQueueClient {
    pub(crate) fn new(resource: ResourceClient, client_key: Option<String>) -> Self {
        Self {
            resource,
            client_key,
        }
    }

    /// The queue ID this client addresses.
    pub fn id(&self) -> &str {
        self.resource.id()
    }

    /// The key identifying this client to the queue.
    pub fn client_key(&self) -> Option<&str> {
        self.client_key.as_deref()
    }

    fn query(&self, limit: Option<u64>, forefront: Option<bool>) -> QueueQuery<'_> {
        QueueQuery {
            limit,
            forefront,
            client_key: self.client_key.as_deref(),
        }
    }

    fn request_segment(id: &str) -> String {
        format!("requests/{}", encode_segment(id))
    }

    /// Fetch up to `limit` requests from the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), fields(queue = %self.resource.id()))]
    pub async fn list_head(&self, limit: Option<u64>) -> Result<QueueHead> {
        let response = self
            .resource
            .http()
            .get_with_query(&self.resource.sub_path("head"), &self.query(limit, None))
            .await?;
        ApifyClient::data(response).await
    }

    /// Add a request to the queue, at the head when `forefront` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, request), fields(queue = %self.resource.id(), url = %request.url))]
    pub async fn add_request(
        &self,
        request: &Request,
        forefront: Option<bool>,
    ) -> Result<QueueOperationInfo> {
        let response = self
            .resource
            .http()
            .post(
                &self.resource.sub_path("requests"),
                &self.query(None, forefront),
                request,
            )
            .await?;
        ApifyClient::data(response).await
    }

    /// Fetch a request by ID; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    #[tracing::instrument(skip(self), fields(queue = %self.resource.id()))]
    pub async fn get_request(&self, request_id: &str) -> Result<Option<Request>> {
        let result = async {
            let response = self
                .resource
                .http()
                .get(&self.resource.sub_path(&Self::request_segment(request_id)))
                .await?;
            ApifyClient::data(response).await
        }
        .await;
        catch_not_found(result)
    }

    /// Replace a stored request. The request must carry its `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError::InvalidArgument`] if the request has no ID, or
    /// an error if the request fails.
    #[tracing::instrument(skip(self, request), fields(queue = %self.resource.id()))]
    pub async fn update_request(
        &self,
        request: &Request,
        forefront: Option<bool>,
    ) -> Result<QueueOperationInfo> {
        let request_id = request.id.as_deref().ok_or_else(|| {
            ApifyError::InvalidArgument("request to update has no id".to_string())
        })?;
        let response = self
            .resource
            .http()
            .put(
                &self.resource.sub_path(&Self::request_segment(request_id)),
                &self.query(None, forefront),
                request,
            )
            .await?;
        ApifyClient::data(response).await
    }

    /// Remove a request from the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), fields(queue = %self.resource.id()))]
    pub async fn delete_request(&self, request_id: &str) -> Result<()> {
        let builder = self
            .resource
            .request(Method::DELETE, Some(&Self::request_segment(request_id)))?
            .query(&self.query(None, None));
        self.resource.send(builder).await?;
        Ok(())
    }
}

impl Resource for RequestQueueClient {
    type Model = RequestQueue;

    fn resource(&self) -> &ResourceClient {
        &self.resource
    }
}

impl Get for RequestQueueClient {}

impl Update for RequestQueueClient {
    type Params = RequestQueueUpdate;
}

impl Delete for RequestQueueClient {}

/// Client for the request queue collection.
#[derive(Debug, Clone)]
pub struct RequestQueueCollectionClient {
    collection: ResourceCollectionClient,
}

impl RequestQueueCollectionClient {
    pub(crate) fn new(collection: ResourceCollectionClient) -> Self {
        Self { collection }
    }
}

impl Collection for RequestQueueCollectionClient {
    type Model = RequestQueue;

    fn collection(&self) -> &ResourceCollectionClient {
        &self.collection
    }
}

impl List for RequestQueueCollectionClient {
    type Query = StorageListQuery;

    fn window(offset: u64, limit: u64) -> Self::Query {
        StorageListQuery {
            offset: Some(offset),
            limit: Some(limit),
            ..Default::default()
        }
    }
}

impl GetOrCreate for RequestQueueCollectionClient {}
