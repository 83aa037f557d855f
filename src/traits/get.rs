//! Get and Delete traits for single resources.

use async_trait::async_trait;

use super::Resource;
use crate::error::Result;

/// Fetch a single resource.
///
/// # Example
///
/// ```ignore
/// use apify_client::{ApifyClient, Get};
///
/// let client = ApifyClient::from_env()?;
/// match client.dataset("my-dataset").get().await? {
///     Some(dataset) => println!("{} items", dataset.item_count.unwrap_or(0)),
///     None => println!("no such dataset"),
/// }
/// ```
#[async_trait]
pub trait Get: Resource {
    /// Fetch the resource.
    ///
    /// Returns `Ok(None)` when the resource does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    async fn get(&self) -> Result<Option<Self::Model>> {
        self.resource().get().await
    }
}

/// Delete a single resource.
#[async_trait]
pub trait Delete: Resource {
    /// Delete the resource. Deleting a missing resource succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn delete(&self) -> Result<()> {
        self.resource().delete().await
    }
}
