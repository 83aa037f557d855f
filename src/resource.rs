//! Shared plumbing for resource sub-clients.
//!
//! A [`ResourceClient`] addresses one remote resource (`datasets/{id}`), a
//! [`ResourceCollectionClient`] addresses a collection (`datasets`). Both
//! only know how to build URLs and run the generic CRUD verbs; the leaf
//! clients add the endpoints specific to their resource.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApifyClient, NO_QUERY};
use crate::error::{catch_not_found, Result};
use crate::pagination::ListPage;

/// Make a resource ID usable as a single path segment.
///
/// Named resources are addressed as `username/resource-name`, which the API
/// accepts as `username~resource-name`.
pub fn to_safe_id(id: &str) -> String {
    encode_segment(&id.replace('/', "~"))
}

/// Percent-encode a caller-supplied value into one path segment.
///
/// `.` and `..` pass through unchanged; [`ApifyClient`] refuses to send a
/// path containing them since URL resolution would drop or climb them.
pub(crate) fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), segment)
    }
}

/// Client for a single remote resource.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    client: ApifyClient,
    id: String,
    path: String,
}

impl ResourceClient {
    /// Address `{parent}/{resource_path}/{id}` relative to the API base URL.
    pub(crate) fn new(client: ApifyClient, parent: &str, resource_path: &str, id: &str) -> Self {
        let path = join_path(&join_path(parent, resource_path), &to_safe_id(id));
        Self {
            client,
            id: id.to_string(),
            path,
        }
    }

    /// The resource ID as given by the caller.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of the resource relative to the versioned base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of a sub-resource (e.g. `items`, `records/{key}`).
    pub fn sub_path(&self, segment: &str) -> String {
        join_path(&self.path, segment)
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &ApifyClient {
        &self.client
    }

    pub(crate) fn request(&self, method: Method, segment: Option<&str>) -> Result<RequestBuilder> {
        match segment {
            Some(segment) => self.client.request(method, &self.sub_path(segment)),
            None => self.client.request(method, &self.path),
        }
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.client.send(builder).await
    }

    /// Fetch the resource; `None` when it does not exist.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn get<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let result = async {
            let response = self.client.get(&self.path).await?;
            ApifyClient::data(response).await
        }
        .await;
        catch_not_found(result)
    }

    /// Replace the given fields of the resource and return the new version.
    #[tracing::instrument(skip(self, new_fields), fields(path = %self.path))]
    pub async fn update<B, T>(&self, new_fields: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.put(&self.path, NO_QUERY, new_fields).await?;
        ApifyClient::data(response).await
    }

    /// Delete the resource. Deleting a missing resource is not an error.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn delete(&self) -> Result<()> {
        let result = self.client.delete(&self.path, NO_QUERY).await;
        catch_not_found(result).map(|_| ())
    }
}

/// Client for a collection of remote resources.
#[derive(Debug, Clone)]
pub struct ResourceCollectionClient {
    client: ApifyClient,
    path: String,
}

#[derive(Serialize)]
struct NameQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl ResourceCollectionClient {
    /// Address `{parent}/{resource_path}` relative to the API base URL.
    pub(crate) fn new(client: ApifyClient, parent: &str, resource_path: &str) -> Self {
        Self {
            client,
            path: join_path(parent, resource_path),
        }
    }

    /// Path of the collection relative to the versioned base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &ApifyClient {
        &self.client
    }

    /// Fetch one page of the collection.
    #[tracing::instrument(skip(self, query), fields(path = %self.path))]
    pub async fn list<Q, T>(&self, query: &Q) -> Result<ListPage<T>>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.get_with_query(&self.path, query).await?;
        ApifyClient::data(response).await
    }

    /// Create a new resource from the given representation.
    #[tracing::instrument(skip(self, resource), fields(path = %self.path))]
    pub async fn create<B, T>(&self, resource: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(&self.path, NO_QUERY, resource).await?;
        ApifyClient::data(response).await
    }

    /// Fetch the resource with the given name, creating it if it is missing.
    ///
    /// Without a name the API creates a new unnamed resource.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn get_or_create<T: DeserializeOwned>(&self, name: Option<&str>) -> Result<T> {
        let builder = self
            .client
            .request(Method::POST, &self.path)?
            .query(&NameQuery { name });
        let response = self.client.send(builder).await?;
        ApifyClient::data(response).await
    }
}
