//! Update trait for modifying resources.

use async_trait::async_trait;
use serde::Serialize;

use super::Resource;
use crate::error::Result;

/// Update an existing resource.
///
/// # Example
///
/// ```ignore
/// use apify_client::{ApifyClient, DatasetUpdate, Update};
///
/// let client = ApifyClient::from_env()?;
/// let renamed = client
///     .dataset("my-dataset")
///     .update(&DatasetUpdate { name: Some("products".to_string()) })
///     .await?;
/// ```
#[async_trait]
pub trait Update: Resource {
    /// Fields that can be changed.
    type Params: Serialize + Send + Sync;

    /// Update the resource and return the updated version.
    ///
    /// # Arguments
    ///
    /// * `params` - The fields to change; unset fields are left untouched
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn update(&self, params: &Self::Params) -> Result<Self::Model> {
        self.resource().update(params).await
    }
}
