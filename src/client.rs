//! Apify API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Resource-specific operations live on the sub-clients returned by the
//! accessor methods ([`ApifyClient::dataset`], [`ApifyClient::webhooks`], ...).

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApifyError, Result};
use crate::models::{
    DatasetClient, DatasetCollectionClient, KeyValueStoreClient, KeyValueStoreCollectionClient,
    LogClient, RequestQueueClient, RequestQueueCollectionClient, WebhookClient,
    WebhookCollectionClient, WebhookDispatchClient, WebhookDispatchCollectionClient,
};
use crate::resource::{ResourceClient, ResourceCollectionClient};

const API_VERSION: &str = "v2";
const USER_AGENT: &str = concat!("apify-client-rust/", env!("CARGO_PKG_VERSION"));

/// A streamed response body.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Empty query string.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Low-level Apify API client.
///
/// Handles authentication and HTTP requests, and hands out sub-clients for
/// the individual resources.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use apify_client::{ApifyClient, Get};
///
/// # async fn example() -> apify_client::Result<()> {
/// // Create from environment variables
/// let client = ApifyClient::from_env()?;
///
/// // Or configure manually
/// let client = ApifyClient::new(Some("your-api-token"), "https://api.apify.com")?;
/// let dataset = client.dataset("my-dataset-id").get().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApifyClient {
    http: Client,
    base_url: Arc<Url>,
    token: Option<String>,
}

impl std::fmt::Debug for ApifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApifyClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// `{"data": ...}` envelope used by most JSON endpoints.
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

/// `{"error": {...}}` envelope used by failed requests.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApifyClient {
    /// Create a client from environment variables.
    ///
    /// Uses `APIFY_TOKEN` for authentication and optionally
    /// `APIFY_API_BASE_URL` for the API URL (defaults to
    /// `https://api.apify.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API URL is invalid.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a new client with the provided token and API URL.
    ///
    /// # Arguments
    ///
    /// * `token` - Apify API token, `None` for anonymous access
    /// * `api_url` - API URL without version (e.g., `https://api.apify.com`)
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid.
    pub fn new(token: Option<&str>, api_url: &str) -> Result<Self> {
        let mut config = ClientConfig::default().with_api_url(api_url);
        config.token = token.map(str::to_string);
        Self::with_config(config)
    }

    /// Create a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let api_url = config.api_url.trim_end_matches('/');
        if api_url.is_empty() {
            return Err(ApifyError::ConfigMissing("API URL is empty".to_string()));
        }
        let base_url = Url::parse(&format!("{api_url}/{API_VERSION}/"))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(ApifyError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: config.token,
        })
    }

    /// Get the versioned base URL (e.g. `https://api.apify.com/v2/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether requests carry an API token.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // -------------------------------------------------------------------------
    // Sub-clients
    // -------------------------------------------------------------------------

    /// Client for a single dataset, by ID or `username~dataset-name`.
    pub fn dataset(&self, id: &str) -> DatasetClient {
        DatasetClient::new(ResourceClient::new(self.clone(), "", "datasets", id))
    }

    /// Client for the dataset collection.
    pub fn datasets(&self) -> DatasetCollectionClient {
        DatasetCollectionClient::new(ResourceCollectionClient::new(self.clone(), "", "datasets"))
    }

    /// Client for a single key-value store.
    pub fn key_value_store(&self, id: &str) -> KeyValueStoreClient {
        KeyValueStoreClient::new(ResourceClient::new(
            self.clone(),
            "",
            "key-value-stores",
            id,
        ))
    }

    /// Client for the key-value store collection.
    pub fn key_value_stores(&self) -> KeyValueStoreCollectionClient {
        KeyValueStoreCollectionClient::new(ResourceCollectionClient::new(
            self.clone(),
            "",
            "key-value-stores",
        ))
    }

    /// Client for a single request queue.
    ///
    /// `client_key` identifies this consumer to the queue; pass the same key
    /// from every process that should be treated as one client.
    pub fn request_queue(&self, id: &str, client_key: Option<&str>) -> RequestQueueClient {
        RequestQueueClient::new(
            ResourceClient::new(self.clone(), "", "request-queues", id),
            client_key.map(str::to_string),
        )
    }

    /// Client for the request queue collection.
    pub fn request_queues(&self) -> RequestQueueCollectionClient {
        RequestQueueCollectionClient::new(ResourceCollectionClient::new(
            self.clone(),
            "",
            "request-queues",
        ))
    }

    /// Client for the log of a build or run.
    pub fn log(&self, id: &str) -> LogClient {
        LogClient::new(ResourceClient::new(self.clone(), "", "logs", id))
    }

    /// Client for a single webhook.
    pub fn webhook(&self, id: &str) -> WebhookClient {
        WebhookClient::new(ResourceClient::new(self.clone(), "", "webhooks", id))
    }

    /// Client for the webhook collection.
    pub fn webhooks(&self) -> WebhookCollectionClient {
        WebhookCollectionClient::new(ResourceCollectionClient::new(self.clone(), "", "webhooks"))
    }

    /// Client for a single webhook dispatch.
    pub fn webhook_dispatch(&self, id: &str) -> WebhookDispatchClient {
        WebhookDispatchClient::new(ResourceClient::new(
            self.clone(),
            "",
            "webhook-dispatches",
            id,
        ))
    }

    /// Client for all webhook dispatches of the user.
    pub fn webhook_dispatches(&self) -> WebhookDispatchCollectionClient {
        WebhookDispatchCollectionClient::new(ResourceCollectionClient::new(
            self.clone(),
            "",
            "webhook-dispatches",
        ))
    }

    // -------------------------------------------------------------------------
    // HTTP helpers
    // -------------------------------------------------------------------------

    /// Start a request to a path relative to the versioned base URL.
    ///
    /// Empty, `.` and `..` segments are refused: URL resolution would turn
    /// them into a different resource, e.g. the store instead of a record.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        check_path(path)?;
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a prepared request and check its status.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(ApifyError::Http)?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(ApifyError::Http)?;

        Self::check_response(response, &method).await
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(self.request(Method::GET, path)?).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        self.send(self.request(Method::GET, path)?.query(query)).await
    }

    /// Make a PUT request with query parameters and a JSON body.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn put<Q, B>(&self, path: &str, query: &Q, body: &B) -> Result<Response>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path)?.query(query).json(body))
            .await
    }

    /// Make a POST request with query parameters and a JSON body.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn post<Q, B>(&self, path: &str, query: &Q, body: &B) -> Result<Response>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path)?.query(query).json(body))
            .await
    }

    /// Make a DELETE request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn delete<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Response> {
        self.send(self.request(Method::DELETE, path)?.query(query))
            .await
    }

    /// Decode a `{"data": ...}` response into `T`.
    pub(crate) async fn data<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(ApifyError::Http)?;
        parse_data(&body)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response, method: &Method) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let (error_type, message) = parse_error_body(&body, status);

        tracing::debug!(status = status.as_u16(), ?error_type, "request failed");

        Err(ApifyError::Api {
            status_code: status.as_u16(),
            error_type,
            message,
            method: method.to_string(),
            url,
        })
    }
}

fn check_path(path: &str) -> Result<()> {
    match path.split('/').find(|segment| matches!(*segment, "" | "." | "..")) {
        Some(segment) => Err(ApifyError::InvalidArgument(format!(
            "'{segment}' is not a valid resource ID or key in path '{path}'"
        ))),
        None => Ok(()),
    }
}

/// Unwrap the `data` field of a JSON envelope.
pub(crate) fn parse_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: DataEnvelope<T> = serde_json::from_slice(body)?;
    envelope.data.ok_or_else(|| {
        ApifyError::InvalidResponse("the \"data\" property is missing in the response".to_string())
    })
}

/// Extract the vendor error type and message from a failed response body.
fn parse_error_body(body: &str, status: reqwest::StatusCode) -> (Option<String>, String) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {status}"));
            (envelope.error.error_type, message)
        }
        Err(_) if body.is_empty() => (None, format!("HTTP {status}")),
        Err(_) => (None, body.to_string()),
    }
}
