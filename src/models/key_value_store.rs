//! Key-value store model and sub-clients.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApifyClient;
use crate::error::{catch_not_found, ApifyError, Result};
use crate::pagination::StorageListQuery;
use crate::resource::{encode_segment, ResourceClient, ResourceCollectionClient};
use crate::traits::{Collection, Delete, Get, GetOrCreate, List, Resource, Update};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A key-value store on the Apify platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueStore {
    /// Store ID.
    pub id: String,

    /// Store name; unnamed stores have none.
    #[serde(default)]
    pub name: Option<String>,

    /// Owner of the store.
    #[serde(default)]
    pub user_id: Option<String>,

    /// When the store was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the store was last modified.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// When the store was last accessed.
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,

    /// Actor that created the store.
    #[serde(default)]
    pub act_id: Option<String>,

    /// Actor run that created the store.
    #[serde(default)]
    pub act_run_id: Option<String>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields of a key-value store that can be changed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueStoreUpdate {
    /// New store name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Paging options for [`KeyValueStoreClient::list_keys`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKeysOptions {
    /// Maximum number of keys to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Return keys after this one (exclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<String>,
}

/// One key of a key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfo {
    /// The record key.
    pub key: String,
    /// Size of the record in bytes.
    #[serde(default)]
    pub size: u64,
}

/// A page of keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueStoreKeys {
    /// The keys on this page.
    pub items: Vec<KeyInfo>,
    /// Number of keys on this page.
    #[serde(default)]
    pub count: u64,
    /// Requested page size.
    #[serde(default)]
    pub limit: u64,
    /// Key the page started after.
    #[serde(default)]
    pub exclusive_start_key: Option<String>,
    /// Whether more keys follow.
    #[serde(default)]
    pub is_truncated: bool,
    /// Key to pass as `exclusive_start_key` for the next page.
    #[serde(default)]
    pub next_exclusive_start_key: Option<String>,
}

/// A stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    /// The record key.
    pub key: String,
    /// The record value.
    pub value: T,
    /// Content type the record was stored with.
    pub content_type: Option<String>,
}

/// Client for a single key-value store.
#[derive(Debug, Clone)]
pub struct KeyValueStoreClient {
    resource: ResourceClient,
}

impl KeyValueStoreClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    /// The store ID this client addresses.
    pub fn id(&self) -> &str {
        self.resource.id()
    }

    fn record_segment(key: &str) -> String {
        format!("records/{}", encode_segment(key))
    }

    /// List keys of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), fields(store = %self.resource.id()))]
    pub async fn list_keys(&self, options: &ListKeysOptions) -> Result<KeyValueStoreKeys> {
        let response = self
            .resource
            .http()
            .get_with_query(&self.resource.sub_path("keys"), options)
            .await?;
        ApifyClient::data(response).await
    }

    /// Fetch a record as raw bytes.
    ///
    /// Returns `Ok(None)` when the store or the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), fields(store = %self.resource.id()))]
    pub async fn get_record_bytes(&self, key: &str) -> Result<Option<Record<Bytes>>> {
        let result = async {
            let builder = self
                .resource
                .request(Method::GET, Some(&Self::record_segment(key)))?;
            let response = self.resource.send(builder).await?;
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let value = response.bytes().await.map_err(ApifyError::Http)?;
            Ok::<_, ApifyError>(Record {
                key: key.to_string(),
                value,
                content_type,
            })
        }
        .await;
        catch_not_found(result)
    }

    /// Fetch a record, decoding JSON content.
    ///
    /// JSON records are parsed; other textual records are returned as a
    /// JSON string. Use [`get_record_bytes`](Self::get_record_bytes) for
    /// binary content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the JSON is malformed, or the
    /// record is not valid UTF-8.
    pub async fn get_record(&self, key: &str) -> Result<Option<Record<Value>>> {
        let Some(record) = self.get_record_bytes(key).await? else {
            return Ok(None);
        };
        let value = decode_record_value(&record.value, record.content_type.as_deref())?;
        Ok(Some(Record {
            key: record.key,
            value,
            content_type: record.content_type,
        }))
    }

    /// Store a JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the request
    /// fails.
    pub async fn set_record<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        let body = serde_json::to_vec(value)?;
        self.set_record_bytes(key, body, JSON_CONTENT_TYPE).await
    }

    /// Store raw bytes under `key` with the given content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, value), fields(store = %self.resource.id()))]
    pub async fn set_record_bytes(
        &self,
        key: &str,
        value: impl Into<Bytes> + Send,
        content_type: &str,
    ) -> Result<()> {
        let builder = self
            .resource
            .request(Method::PUT, Some(&Self::record_segment(key)))?
            .header(CONTENT_TYPE, content_type)
            .body(value.into());
        self.resource.send(builder).await?;
        Ok(())
    }

    /// Delete the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), fields(store = %self.resource.id()))]
    pub async fn delete_record(&self, key: &str) -> Result<()> {
        let builder = self
            .resource
            .request(Method::DELETE, Some(&Self::record_segment(key)))?;
        self.resource.send(builder).await?;
        Ok(())
    }
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let mime = ct.split(';').next().unwrap_or("").trim();
        mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
    })
}

fn decode_record_value(body: &[u8], content_type: Option<&str>) -> Result<Value> {
    if is_json_content_type(content_type) {
        return Ok(serde_json::from_slice(body)?);
    }
    String::from_utf8(body.to_vec())
        .map(Value::String)
        .map_err(|_| {
            ApifyError::InvalidResponse(
                "record is not valid UTF-8; use get_record_bytes for binary records".to_string(),
            )
        })
}

impl Resource for KeyValueStoreClient {
    type Model = KeyValueStore;

    fn resource(&self) -> &ResourceClient {
        &self.resource
    }
}

impl Get for KeyValueStoreClient {}

impl Update for KeyValueStoreClient {
    type Params = KeyValueStoreUpdate;
}

impl Delete for KeyValueStoreClient {}

/// Client for the key-value store collection.
#[derive(Debug, Clone)]
pub struct KeyValueStoreCollectionClient {
    collection: ResourceCollectionClient,
}

impl KeyValueStoreCollectionClient {
    pub(crate) fn new(collection: ResourceCollectionClient) -> Self {
        Self { collection }
    }
}

impl Collection for KeyValueStoreCollectionClient {
    type Model = KeyValueStore;

    fn collection(&self) -> &ResourceCollectionClient {
        &self.collection
    }
}

impl List for KeyValueStoreCollectionClient {
    type Query = StorageListQuery;

    fn window(offset: u64, limit: u64) -> Self::Query {
        StorageListQuery {
            offset: Some(offset),
            limit: Some(limit),
            ..Default::default()
        }
    }
}

impl GetOrCreate for KeyValueStoreCollectionClient {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_segment_encodes_key() {
        assert_eq!(KeyValueStoreClient::record_segment("INPUT"), "records/INPUT");
        assert_eq!(
            KeyValueStoreClient::record_segment("a b/c"),
            "records/a%20b%2Fc"
        );
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type(Some("application/json")));
        assert!(is_json_content_type(Some("application/json; charset=utf-8")));
        assert!(is_json_content_type(Some("application/ld+json")));
        assert!(!is_json_content_type(Some("text/plain")));
        assert!(!is_json_content_type(None));
    }

    #[test]
    fn test_decode_record_value() {
        let value = decode_record_value(br#"{"a": 1}"#, Some("application/json")).unwrap();
        assert_eq!(value["a"], 1);

        let value = decode_record_value(b"hello", Some("text/plain")).unwrap();
        assert_eq!(value, Value::String("hello".to_string()));

        assert!(decode_record_value(&[0xff, 0xfe], Some("image/png")).is_err());
        assert!(decode_record_value(b"{not json", Some("application/json")).is_err());
    }

    #[test]
    fn test_keys_deserialize() {
        let keys: KeyValueStoreKeys = serde_json::from_str(
            r#"{
                "items": [{"key": "INPUT", "size": 32}, {"key": "OUTPUT", "size": 128}],
                "count": 2,
                "limit": 2,
                "exclusiveStartKey": null,
                "isTruncated": true,
                "nextExclusiveStartKey": "OUTPUT"
            }"#,
        )
        .unwrap();
        assert_eq!(keys.items.len(), 2);
        assert!(keys.is_truncated);
        assert_eq!(keys.next_exclusive_start_key.as_deref(), Some("OUTPUT"));
    }

    #[test]
    fn test_list_keys_options_query() {
        let options = ListKeysOptions {
            limit: Some(10),
            exclusive_start_key: Some("INPUT".to_string()),
        };
        let serialized = serde_qs::to_string(&options).unwrap();
        assert!(serialized.contains("limit=10"));
        assert!(serialized.contains("exclusiveStartKey=INPUT"));
    }
}
