//! Log sub-client.

use futures::stream::{StreamExt, TryStreamExt};

use crate::client::ByteStream;
use crate::error::{catch_not_found, ApifyError, Result};
use crate::resource::ResourceClient;

/// Client for the log of an actor build or run.
#[derive(Debug, Clone)]
pub struct LogClient {
    resource: ResourceClient,
}

impl LogClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    /// The build or run ID this client addresses.
    pub fn id(&self) -> &str {
        self.resource.id()
    }

    /// Fetch the whole log as text; `None` when there is no such log.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    #[tracing::instrument(skip(self), fields(log = %self.resource.id()))]
    pub async fn get(&self) -> Result<Option<String>> {
        let result = async {
            let response = self.resource.http().get(self.resource.path()).await?;
            response.text().await.map_err(ApifyError::Http)
        }
        .await;
        catch_not_found(result)
    }

    /// Stream the log; `None` when there is no such log.
    ///
    /// The connection stays open until the stream is exhausted or dropped,
    /// so a log of a running actor can be followed as it grows.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    #[tracing::instrument(skip(self), fields(log = %self.resource.id()))]
    pub async fn stream(&self) -> Result<Option<ByteStream>> {
        let result = self.resource.http().get(self.resource.path()).await;
        Ok(catch_not_found(result)?
            .map(|response| response.bytes_stream().map_err(ApifyError::Http).boxed()))
    }
}
