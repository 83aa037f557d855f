//! Collection traits: list, create and get-or-create.

use async_trait::async_trait;
use serde::Serialize;

use super::Collection;
use crate::error::Result;
use crate::pagination::ListPage;

/// Default page size for [`List::list_all`].
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List the entries of a collection with offset pagination.
///
/// # Example
///
/// ```ignore
/// use apify_client::{ApifyClient, List, StorageListQuery};
///
/// let client = ApifyClient::from_env()?;
///
/// // Fetch a single page
/// let page = client.datasets().list(&StorageListQuery::default()).await?;
///
/// // Fetch all pages
/// let all = client.datasets().list_all().await?;
/// ```
#[async_trait]
pub trait List: Collection {
    /// Query parameters for filtering and paging.
    type Query: Serialize + Default + Send + Sync;

    /// List entries matching the query (single page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(&self, query: &Self::Query) -> Result<ListPage<Self::Model>> {
        self.collection().list(query).await
    }

    /// Build the query for one window of [`List::list_all`].
    fn window(offset: u64, limit: u64) -> Self::Query;

    /// List all entries (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(&self) -> Result<Vec<Self::Model>> {
        let mut all_items = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let query = Self::window(offset, DEFAULT_PAGE_SIZE);
            let page = self.list(&query).await?;
            let has_more = page.has_more() && !page.is_empty();
            offset += page.count;
            all_items.extend(page.items);

            if !has_more {
                break;
            }

            pages += 1;
            // Safety limit to prevent infinite loops
            if pages >= MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
        }

        Ok(all_items)
    }
}

/// Create a new entry in a collection.
#[async_trait]
pub trait Create: Collection {
    /// The representation sent to the API.
    type Params: Serialize + Send + Sync;

    /// Create the entry and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn create(&self, params: &Self::Params) -> Result<Self::Model> {
        self.collection().create(params).await
    }
}

/// Retrieve a named entry, creating it when it does not exist.
#[async_trait]
pub trait GetOrCreate: Collection {
    /// Fetch the entry called `name`, or create it.
    ///
    /// With `name = None` a new unnamed entry is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn get_or_create(&self, name: Option<&str>) -> Result<Self::Model> {
        self.collection().get_or_create(name).await
    }
}
