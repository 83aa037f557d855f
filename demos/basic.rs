//! Basic example demonstrating the Apify API client.
//!
//! Run with:
//! ```
//! APIFY_TOKEN=your-token cargo run --example basic
//! ```

use apify_client::{
    ApifyClient, Get, GetOrCreate, List, ListItemsOptions, ListKeysOptions, Request,
    StorageListQuery,
};
use futures::TryStreamExt;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> apify_client::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating Apify client...");
    let client = ApifyClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List named datasets
    println!("\n--- Listing Datasets ---");
    let datasets = client.datasets().list(&StorageListQuery::default()).await?;
    println!("Found {} datasets (total: {})", datasets.count, datasets.total);
    for dataset in &datasets.items {
        println!(
            "  - {} ({}, {} items)",
            dataset.name.as_deref().unwrap_or("(unnamed)"),
            dataset.id,
            dataset.item_count.unwrap_or(0)
        );
    }

    // Write some items and read them back
    println!("\n--- Dataset Items ---");
    let dataset = client.datasets().get_or_create(Some("basic-example")).await?;
    let dataset_client = client.dataset(&dataset.id);
    dataset_client
        .push_items(&json!([
            {"title": "First", "url": "https://example.com/1"},
            {"title": "Second", "url": "https://example.com/2"}
        ]))
        .await?;

    let page = dataset_client
        .list_items::<Value>(&ListItemsOptions {
            limit: Some(5),
            ..Default::default()
        })
        .await?;
    println!("First page: {} of {} items", page.count, page.total);

    let all: Vec<Value> = dataset_client
        .iterate_items(0, None, &ListItemsOptions::default())
        .try_collect()
        .await?;
    println!("Iterated over {} items", all.len());

    // Records in the default store of this account
    println!("\n--- Key-Value Store ---");
    let store = client.key_value_stores().get_or_create(Some("basic-example")).await?;
    let store_client = client.key_value_store(&store.id);
    store_client
        .set_record("OUTPUT", &json!({"items": all.len()}))
        .await?;
    let keys = store_client.list_keys(&ListKeysOptions::default()).await?;
    for key in &keys.items {
        println!("  - {} ({} bytes)", key.key, key.size);
    }

    // Enqueue a request and look at the queue head
    println!("\n--- Request Queue ---");
    let queue = client.request_queues().get_or_create(Some("basic-example")).await?;
    let queue_client = client.request_queue(&queue.id, None);
    let info = queue_client
        .add_request(&Request::new("https://example.com"), None)
        .await?;
    println!(
        "Request {} (already present: {})",
        info.request_id, info.was_already_present
    );
    let head = queue_client.list_head(Some(10)).await?;
    println!("Head holds {} pending requests", head.items.len());

    if let Some(refreshed) = client.dataset(&dataset.id).get().await? {
        println!(
            "\nDataset {} now has {} items",
            refreshed.id,
            refreshed.item_count.unwrap_or(0)
        );
    }

    println!("\nDone!");
    Ok(())
}
