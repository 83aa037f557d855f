//! Dataset model and sub-clients.
//!
//! Datasets are append-only collections of JSON records. Besides the usual
//! get/update/delete, the dataset client reads items page by page, iterates
//! over arbitrarily large item ranges, and exports items in bulk.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ByteStream;
use crate::error::{ApifyError, Result};
use crate::pagination::{paginate_offsets, ListPage, StorageListQuery};
use crate::params;
use crate::resource::{ResourceClient, ResourceCollectionClient};
use crate::traits::{Collection, Delete, Get, GetOrCreate, List, Resource, Update};

const PAGINATION_TOTAL: &str = "x-apify-pagination-total";
const PAGINATION_OFFSET: &str = "x-apify-pagination-offset";
const PAGINATION_LIMIT: &str = "x-apify-pagination-limit";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A lazily fetched sequence of dataset items.
pub type ItemStream<T> = BoxStream<'static, Result<T>>;

/// A dataset on the Apify platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Dataset ID.
    pub id: String,

    /// Dataset name; unnamed datasets have none.
    #[serde(default)]
    pub name: Option<String>,

    /// Owner of the dataset.
    #[serde(default)]
    pub user_id: Option<String>,

    /// When the dataset was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the dataset was last modified.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// When the dataset was last accessed.
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,

    /// Number of stored items.
    #[serde(default)]
    pub item_count: Option<u64>,

    /// Number of non-empty items.
    #[serde(default)]
    pub clean_item_count: Option<u64>,

    /// Actor that created the dataset.
    #[serde(default)]
    pub act_id: Option<String>,

    /// Actor run that created the dataset.
    #[serde(default)]
    pub act_run_id: Option<String>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields of a dataset that can be changed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetUpdate {
    /// New dataset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Filters for reading dataset items.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsOptions {
    /// Number of items to skip at the start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// Maximum number of items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Skip empty items and hidden fields (shortcut for `skip_empty` plus
    /// `skip_hidden`). Pages may then hold fewer items than `limit`.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub clean: Option<bool>,

    /// Return items newest first.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub desc: Option<bool>,

    /// Only keep these fields, in this order.
    #[serde(
        serialize_with = "params::comma_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub fields: Option<Vec<String>>,

    /// Drop these fields.
    #[serde(
        serialize_with = "params::comma_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub omit: Option<Vec<String>>,

    /// Field to unwind into separate records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unwind: Option<String>,

    /// Skip empty items.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub skip_empty: Option<bool>,

    /// Skip fields starting with `#`.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub skip_hidden: Option<bool>,
}

/// Options for exporting dataset items in bulk.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItemsOptions {
    /// Item filters shared with [`DatasetClient::list_items`].
    #[serde(flatten)]
    pub items: ListItemsOptions,

    /// Force (or suppress) the UTF-8 byte order mark.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub bom: Option<bool>,

    /// CSV delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    /// Omit the CSV header row.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub skip_header_row: Option<bool>,

    /// XML root element name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_root: Option<String>,

    /// XML element name wrapping each item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_row: Option<String>,
}

/// Export format for dataset items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemFormat {
    /// JSON array.
    #[default]
    Json,
    /// One JSON object per line.
    Jsonl,
    /// Comma-separated values.
    Csv,
    /// HTML table.
    Html,
    /// Excel workbook.
    Xlsx,
    /// XML document.
    Xml,
    /// RSS feed.
    Rss,
}

impl std::fmt::Display for ItemFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ItemFormat::Json => "json",
            ItemFormat::Jsonl => "jsonl",
            ItemFormat::Csv => "csv",
            ItemFormat::Html => "html",
            ItemFormat::Xlsx => "xlsx",
            ItemFormat::Xml => "xml",
            ItemFormat::Rss => "rss",
        })
    }
}

impl std::str::FromStr for ItemFormat {
    type Err = ApifyError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "json" => ItemFormat::Json,
            "jsonl" => ItemFormat::Jsonl,
            "csv" => ItemFormat::Csv,
            "html" => ItemFormat::Html,
            "xlsx" => ItemFormat::Xlsx,
            "xml" => ItemFormat::Xml,
            "rss" => ItemFormat::Rss,
            other => {
                return Err(ApifyError::InvalidArgument(format!(
                    "unknown item format '{other}'"
                )))
            }
        })
    }
}

#[derive(Serialize)]
struct DownloadQuery<'a> {
    format: ItemFormat,
    #[serde(flatten)]
    options: &'a DownloadItemsOptions,
}

/// Client for a single dataset.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    resource: ResourceClient,
}

impl DatasetClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    /// The dataset ID this client addresses.
    pub fn id(&self) -> &str {
        self.resource.id()
    }

    /// Read one page of items.
    ///
    /// `total`, `offset` and `limit` come from the pagination headers. `count`
    /// is the number of items actually returned: the server's count header
    /// is wrong when empty items or hidden fields are filtered out.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the pagination headers are
    /// missing.
    #[tracing::instrument(skip(self, options), fields(dataset = %self.resource.id()))]
    pub async fn list_items<T: DeserializeOwned>(
        &self,
        options: &ListItemsOptions,
    ) -> Result<ListPage<T>> {
        let response = self
            .resource
            .http()
            .get_with_query(&self.resource.sub_path("items"), options)
            .await?;

        let total = header_u64(&response, PAGINATION_TOTAL)?
            .ok_or_else(|| missing_header(PAGINATION_TOTAL))?;
        let offset = header_u64(&response, PAGINATION_OFFSET)?
            .or(options.offset)
            .unwrap_or(0);
        let limit = header_u64(&response, PAGINATION_LIMIT)?
            .or(options.limit)
            .unwrap_or(u64::MAX);

        let mut items: Vec<T> = response.json().await.map_err(ApifyError::Http)?;
        if let Some(max) = options.limit {
            items.truncate(usize::try_from(max).unwrap_or(usize::MAX));
        }

        Ok(ListPage {
            count: items.len() as u64,
            items,
            total,
            offset,
            limit,
            desc: options.desc.unwrap_or(false),
        })
    }

    /// Iterate over items starting at `offset`, up to `limit` items.
    ///
    /// Items are fetched lazily in pages of at most
    /// [`ITERATION_PAGE_SIZE`](crate::pagination::ITERATION_PAGE_SIZE). When
    /// the dataset reports fewer items than requested, iteration ends at the
    /// reported total. `offset` and `limit` in `options` are ignored. Every
    /// call returns a fresh stream starting over from `offset`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::TryStreamExt;
    ///
    /// let items: Vec<serde_json::Value> = client
    ///     .dataset("my-dataset")
    ///     .iterate_items(0, None, &Default::default())
    ///     .try_collect()
    ///     .await?;
    /// ```
    pub fn iterate_items<T>(
        &self,
        offset: u64,
        limit: Option<u64>,
        options: &ListItemsOptions,
    ) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        let options = options.clone();

        paginate_offsets(offset, limit, move |offset, limit| {
            let client = client.clone();
            let page_options = ListItemsOptions {
                offset: Some(offset),
                limit: Some(limit),
                ..options.clone()
            };
            async move { client.list_items::<T>(&page_options).await }
        })
        .boxed()
    }

    /// Export items in the given format as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, options), fields(dataset = %self.resource.id()))]
    pub async fn download_items(
        &self,
        format: ItemFormat,
        options: &DownloadItemsOptions,
    ) -> Result<Bytes> {
        let response = self.export(format, options).await?;
        response.bytes().await.map_err(ApifyError::Http)
    }

    /// Export items in the given format as a byte stream.
    ///
    /// The connection stays open until the stream is exhausted or dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; errors while reading surface
    /// as stream items.
    #[tracing::instrument(skip(self, options), fields(dataset = %self.resource.id()))]
    pub async fn stream_items(
        &self,
        format: ItemFormat,
        options: &DownloadItemsOptions,
    ) -> Result<ByteStream> {
        let response = self.export(format, options).await?;
        Ok(response.bytes_stream().map_err(ApifyError::Http).boxed())
    }

    async fn export(&self, format: ItemFormat, options: &DownloadItemsOptions) -> Result<Response> {
        let query = DownloadQuery { format, options };
        self.resource
            .http()
            .get_with_query(&self.resource.sub_path("items"), &query)
            .await
    }

    /// Append items to the dataset.
    ///
    /// `items` is either a single JSON object or an array of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the items cannot be serialized or the request
    /// fails.
    pub async fn push_items<B: Serialize + ?Sized>(&self, items: &B) -> Result<()> {
        let body = serde_json::to_string(items)?;
        self.push_items_raw(&body).await
    }

    /// Append items given as an already serialized JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, json), fields(dataset = %self.resource.id(), bytes = json.len()))]
    pub async fn push_items_raw(&self, json: &str) -> Result<()> {
        let builder = self
            .resource
            .request(Method::POST, Some("items"))?
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(json.to_string());
        self.resource.send(builder).await?;
        Ok(())
    }
}

fn missing_header(name: &str) -> ApifyError {
    ApifyError::InvalidResponse(format!("missing {name} header"))
}

fn header_u64(response: &Response, name: &str) -> Result<Option<u64>> {
    let Some(value) = response.headers().get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| ApifyError::InvalidResponse(format!("invalid {name} header: {value:?}")))
}

impl Resource for DatasetClient {
    type Model = Dataset;

    fn resource(&self) -> &ResourceClient {
        &self.resource
    }
}

impl Get for DatasetClient {}

impl Update for DatasetClient {
    type Params = DatasetUpdate;
}

impl Delete for DatasetClient {}

/// Client for the dataset collection.
#[derive(Debug, Clone)]
pub struct DatasetCollectionClient {
    collection: ResourceCollectionClient,
}

impl DatasetCollectionClient {
    pub(crate) fn new(collection: ResourceCollectionClient) -> Self {
        Self { collection }
    }
}

impl Collection for DatasetCollectionClient {
    type Model = Dataset;

    fn collection(&self) -> &ResourceCollectionClient {
        &self.collection
    }
}

impl List for DatasetCollectionClient {
    type Query = StorageListQuery;

    fn window(offset: u64, limit: u64) -> Self::Query {
        StorageListQuery {
            offset: Some(offset),
            limit: Some(limit),
            ..Default::default()
        }
    }
}

impl GetOrCreate for DatasetCollectionClient {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_deserialize() {
        let json = r#"{
            "id": "WkzbQMuFYuamGv3YF",
            "name": "d7b9MDYsbtX5L7XAj",
            "userId": "wRsJZtadYvn4mBZmm",
            "createdAt": "2019-12-12T07:34:14.202Z",
            "modifiedAt": "2019-12-13T08:36:13.202Z",
            "accessedAt": "2019-12-14T08:36:13.202Z",
            "itemCount": 7,
            "cleanItemCount": 5,
            "actId": null,
            "actRunId": null,
            "fields": []
        }"#;

        let dataset: Dataset = serde_json::from_str(json).expect("Failed to deserialize dataset");

        assert_eq!(dataset.id, "WkzbQMuFYuamGv3YF");
        assert_eq!(dataset.name.as_deref(), Some("d7b9MDYsbtX5L7XAj"));
        assert_eq!(dataset.item_count, Some(7));
        assert_eq!(dataset.clean_item_count, Some(5));
        assert!(dataset.act_id.is_none());
        let created = dataset.created_at.expect("createdAt should parse");
        assert_eq!(created.to_rfc3339(), "2019-12-12T07:34:14.202+00:00");
        // Unknown fields survive in `extra`.
        assert!(dataset.extra.contains_key("fields"));
    }

    #[test]
    fn test_list_items_options_query() {
        let options = ListItemsOptions {
            offset: Some(10),
            limit: Some(5),
            clean: Some(true),
            fields: Some(vec!["url".to_string(), "title".to_string()]),
            skip_hidden: Some(false),
            ..Default::default()
        };
        let serialized = serde_qs::to_string(&options).expect("Failed to serialize query");

        assert!(serialized.contains("offset=10"));
        assert!(serialized.contains("limit=5"));
        assert!(serialized.contains("clean=1"));
        assert!(serialized.contains("skipHidden=0"));
        assert!(serialized.contains("fields=url"));
        assert!(!serialized.contains("desc"));
    }

    #[test]
    fn test_item_format_round_trips_through_str() {
        for format in [
            ItemFormat::Json,
            ItemFormat::Jsonl,
            ItemFormat::Csv,
            ItemFormat::Html,
            ItemFormat::Xlsx,
            ItemFormat::Xml,
            ItemFormat::Rss,
        ] {
            let parsed: ItemFormat = format.to_string().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert!("yaml".parse::<ItemFormat>().is_err());
        assert_eq!("CSV".parse::<ItemFormat>().unwrap(), ItemFormat::Csv);
    }

    #[test]
    fn test_dataset_update_skips_unset() {
        let body = serde_json::to_value(DatasetUpdate::default()).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }
}
