//! Apify API client library.
//!
//! A Rust library for the Apify platform REST API. The root
//! [`ApifyClient`] holds credentials and the connection pool and hands out
//! sub-clients for datasets, key-value stores, request queues, logs,
//! webhooks and webhook dispatches.
//!
//! # Quick Start
//!
//! ```no_run
//! use apify_client::{ApifyClient, GetOrCreate, ListItemsOptions, Get};
//! use futures::TryStreamExt;
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> apify_client::Result<()> {
//!     // Create client from environment variables
//!     let client = ApifyClient::from_env()?;
//!
//!     // Get or create a named dataset and push some items
//!     let dataset = client.datasets().get_or_create(Some("products")).await?;
//!     let products = client.dataset(&dataset.id);
//!     products
//!         .push_items(&serde_json::json!([{"sku": "A1"}, {"sku": "B2"}]))
//!         .await?;
//!
//!     // Fetch one page
//!     let page = products
//!         .list_items::<Value>(&ListItemsOptions::default())
//!         .await?;
//!     println!("{} of {} items", page.count, page.total);
//!
//!     // Or walk every item, one page request at a time
//!     let all: Vec<Value> = products
//!         .iterate_items(0, None, &ListItemsOptions::default())
//!         .try_collect()
//!         .await?;
//!     println!("Fetched {} items", all.len());
//!
//!     if let Some(info) = products.get().await? {
//!         println!("Dataset {} has {:?} items", info.id, info.item_count);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Sub-clients implement the operation traits their endpoints support:
//!
//! - [`Get`] / [`Delete`] / [`Update`] - single resources
//! - [`List`] / [`Create`] / [`GetOrCreate`] - collections
//!
//! Endpoints specific to one resource (dataset items, key-value records,
//! queue requests, webhook tests) are inherent methods on the sub-client.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `APIFY_TOKEN` (optional) - API token sent as a bearer token
//! - `APIFY_API_BASE_URL` (optional) - API URL (defaults to `https://api.apify.com`)

mod client;
mod config;
mod error;
mod models;
mod pagination;
mod params;
mod resource;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{ApifyClient, ByteStream};
pub use config::{ClientConfig, API_URL_ENV, DEFAULT_API_URL, DEFAULT_TIMEOUT, TOKEN_ENV};
pub use error::{ApifyError, Result};
pub use pagination::{ListPage, ListQuery, StorageListQuery, ITERATION_PAGE_SIZE};
pub use resource::{to_safe_id, ResourceClient, ResourceCollectionClient};

// Re-export traits
pub use traits::{
    Collection, Create, Delete, Get, GetOrCreate, List, Resource, Update, DEFAULT_PAGE_SIZE,
};

// Re-export models
pub use models::{
    // Dataset types
    Dataset,
    DatasetClient,
    DatasetCollectionClient,
    DatasetUpdate,
    DownloadItemsOptions,
    ItemFormat,
    ItemStream,
    ListItemsOptions,
    // Key-value store types
    KeyInfo,
    KeyValueStore,
    KeyValueStoreClient,
    KeyValueStoreCollectionClient,
    KeyValueStoreKeys,
    KeyValueStoreUpdate,
    ListKeysOptions,
    Record,
    // Request queue types
    QueueHead,
    QueueOperationInfo,
    Request,
    RequestQueue,
    RequestQueueClient,
    RequestQueueCollectionClient,
    RequestQueueUpdate,
    // Log
    LogClient,
    // Webhook types
    Webhook,
    WebhookClient,
    WebhookCollectionClient,
    WebhookCondition,
    WebhookDispatch,
    WebhookDispatchCall,
    WebhookDispatchClient,
    WebhookDispatchCollectionClient,
    WebhookEventType,
    WebhookRepresentation,
};
