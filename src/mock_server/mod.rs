//! Mock Apify API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Apify
//! API for integration and end-to-end testing. Unlike wiremock which mocks
//! at the HTTP level per-test, this server maintains state across requests,
//! so items pushed to a dataset can be paged back out.
//!
//! # Example
//!
//! ```ignore
//! use apify_client::mock_server::MockServer;
//! use apify_client::{ApifyClient, Get};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await.unwrap();
//!     let client = ApifyClient::new(Some("test-token"), server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let dataset = client.dataset("datasetProducts").get().await.unwrap();
//!     assert!(dataset.is_some());
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockDataset, MockKeyValueStore, MockRecord, MockRequestQueue, MockState};
