//! Mock Apify API server.
//!
//! Provides an axum-based HTTP server that simulates the Apify API.

use std::io;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock Apify API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic, stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> io::Result<Self> {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start_empty() -> io::Result<Self> {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_state(state: MockState) -> io::Result<Self> {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        })
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL as the API URL when creating an `ApifyClient`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for (dataset, items) in scenario.datasets {
            state = state.with_dataset(dataset, items);
        }
        for store in scenario.key_value_stores {
            state = state.with_key_value_store(store);
        }
        for (store_id, key, value, content_type) in scenario.records {
            state = state.with_record(&store_id, &key, &value, &content_type);
        }
        for (queue, requests) in scenario.request_queues {
            state = state.with_request_queue(queue, requests);
        }
        for (id, text) in scenario.logs {
            state = state.with_log(&id, &text);
        }
        for webhook in scenario.webhooks {
            state = state.with_webhook(webhook);
        }
        for dispatch in scenario.dispatches {
            state = state.with_dispatch(dispatch);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Dataset routes
            .route(
                "/v2/datasets",
                get(handlers::list_datasets).post(handlers::get_or_create_dataset),
            )
            .route(
                "/v2/datasets/:id",
                get(handlers::get_dataset)
                    .put(handlers::update_dataset)
                    .delete(handlers::delete_dataset),
            )
            .route(
                "/v2/datasets/:id/items",
                get(handlers::list_items).post(handlers::push_items),
            )
            // Key-value store routes
            .route(
                "/v2/key-value-stores",
                get(handlers::list_key_value_stores)
                    .post(handlers::get_or_create_key_value_store),
            )
            .route(
                "/v2/key-value-stores/:id",
                get(handlers::get_key_value_store)
                    .put(handlers::update_key_value_store)
                    .delete(handlers::delete_key_value_store),
            )
            .route("/v2/key-value-stores/:id/keys", get(handlers::list_keys))
            .route(
                "/v2/key-value-stores/:id/records/:key",
                get(handlers::get_record)
                    .put(handlers::put_record)
                    .delete(handlers::delete_record),
            )
            // Request queue routes
            .route(
                "/v2/request-queues",
                get(handlers::list_request_queues).post(handlers::get_or_create_request_queue),
            )
            .route(
                "/v2/request-queues/:id",
                get(handlers::get_request_queue)
                    .put(handlers::update_request_queue)
                    .delete(handlers::delete_request_queue),
            )
            .route("/v2/request-queues/:id/head", get(handlers::list_head))
            .route(
                "/v2/request-queues/:id/requests",
                post(handlers::add_request),
            )
            .route(
                "/v2/request-queues/:id/requests/:request_id",
                get(handlers::get_request)
                    .put(handlers::update_request)
                    .delete(handlers::delete_request),
            )
            // Log routes
            .route("/v2/logs/:id", get(handlers::get_log))
            // Webhook routes
            .route(
                "/v2/webhooks",
                get(handlers::list_webhooks).post(handlers::create_webhook),
            )
            .route(
                "/v2/webhooks/:id",
                get(handlers::get_webhook)
                    .put(handlers::update_webhook)
                    .delete(handlers::delete_webhook),
            )
            .route("/v2/webhooks/:id/test", post(handlers::test_webhook))
            .route(
                "/v2/webhooks/:id/dispatches",
                get(handlers::list_webhook_dispatches),
            )
            .route("/v2/webhook-dispatches", get(handlers::list_dispatches))
            .route("/v2/webhook-dispatches/:id", get(handlers::get_dispatch))
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApifyClient, Get};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await.unwrap();

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_dataset_with_apify_client() {
        let server = MockServer::start().await.unwrap();
        let client = ApifyClient::new(Some("test-token"), server.url()).unwrap();

        let dataset = client
            .dataset("datasetProducts")
            .get()
            .await
            .expect("Failed to get dataset")
            .expect("Dataset should exist");

        assert_eq!(dataset.name.as_deref(), Some("products"));
        assert_eq!(dataset.item_count, Some(25));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await.unwrap();
        let client = ApifyClient::new(Some("test-token"), server.url()).unwrap();

        let result = client.dataset("nonexistent").get().await.unwrap();
        assert!(result.is_none());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_dataset(
            Fixtures::dataset("myDataset", Some("mine")),
            Fixtures::product_items(3),
        );

        let server = MockServer::with_state(state).await.unwrap();
        let client = ApifyClient::new(None, server.url()).unwrap();

        let dataset = client
            .dataset("someone/mine")
            .get()
            .await
            .unwrap()
            .expect("Dataset should resolve by name");
        assert_eq!(dataset.id, "myDataset");

        server.shutdown().await;
    }
}
