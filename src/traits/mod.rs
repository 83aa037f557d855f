//! Trait definitions for Apify operations.
//!
//! Each sub-client implements the traits its endpoints support. The default
//! method bodies delegate to the shared resource plumbing, so most
//! implementations only name their model and parameter types.

mod get;
mod list;
mod update;

use serde::de::DeserializeOwned;

use crate::resource::{ResourceClient, ResourceCollectionClient};

pub use get::{Delete, Get};
pub use list::{Create, GetOrCreate, List, DEFAULT_PAGE_SIZE};
pub use update::Update;

/// A sub-client addressing a single remote resource.
pub trait Resource: Send + Sync {
    /// The record the API returns for this resource.
    type Model: DeserializeOwned + Send;

    /// The shared resource plumbing.
    fn resource(&self) -> &ResourceClient;
}

/// A sub-client addressing a collection of remote resources.
pub trait Collection: Send + Sync {
    /// The record the API returns for each collection entry.
    type Model: DeserializeOwned + Send;

    /// The shared collection plumbing.
    fn collection(&self) -> &ResourceCollectionClient;
}
