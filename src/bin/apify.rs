//! Apify API CLI binary.
//!
//! A command-line interface for inspecting Apify storages and webhooks.

use std::io::Write;
use std::process::ExitCode;

use apify_client::cli::{Cli, Command, Entity};
use apify_client::output::PrettyPrint;
use apify_client::{
    ApifyClient, ApifyError, Dataset, DownloadItemsOptions, Get, KeyInfo, KeyValueStore,
    List, ListItemsOptions, ListKeysOptions, ListPage, ListQuery, Request, RequestQueue,
    StorageListQuery, Webhook, WebhookDispatch,
};
use clap::Parser;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match ApifyClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check the APIFY_API_BASE_URL environment variable");
            return ExitCode::FAILURE;
        }
    };

    if !client.has_token() {
        tracing::warn!("APIFY_TOKEN is not set, only public resources are accessible");
    }

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &ApifyClient, cli: Cli) -> apify_client::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Get { entity, id } => handle_get(client, entity, &id, json).await,
        Command::List {
            entity,
            offset,
            limit,
            desc,
        } => handle_list(client, entity, offset, limit, desc, json).await,
        Command::Items {
            dataset,
            offset,
            limit,
            fields,
            clean,
        } => {
            let options = ListItemsOptions {
                fields: (!fields.is_empty()).then_some(fields),
                clean: clean.then_some(true),
                ..Default::default()
            };
            let items: Vec<Value> = client
                .dataset(&dataset)
                .iterate_items(offset, limit, &options)
                .try_collect()
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in &items {
                    println!("{item}");
                }
            }
            Ok(())
        }
        Command::Download { dataset, format } => {
            let bytes = client
                .dataset(&dataset)
                .download_items(format, &DownloadItemsOptions::default())
                .await?;
            write_stdout(&bytes)
        }
        Command::Push { dataset, items } => {
            let parsed: Value = serde_json::from_str(&items)?;
            client.dataset(&dataset).push_items(&parsed).await?;
            eprintln!("Pushed to dataset {dataset}");
            Ok(())
        }
        Command::Keys {
            store,
            limit,
            exclusive_start_key,
        } => {
            let options = ListKeysOptions {
                limit,
                exclusive_start_key,
            };
            let keys = client.key_value_store(&store).list_keys(&options).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else {
                let rows: Vec<KeyRow> = keys.items.iter().map(KeyRow::from).collect();
                println!("{}", Table::new(rows));
                if let Some(next) = keys.next_exclusive_start_key.filter(|_| keys.is_truncated) {
                    println!("\nMore keys after '{next}'");
                }
            }
            Ok(())
        }
        Command::Record { store, key } => {
            let record = client
                .key_value_store(&store)
                .get_record_bytes(&key)
                .await?
                .ok_or_else(|| not_found("record", &key))?;
            write_stdout(&record.value)
        }
        Command::Head { queue, limit } => {
            let head = client.request_queue(&queue, None).list_head(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&head)?);
            } else {
                let rows: Vec<RequestRow> = head.items.iter().map(RequestRow::from).collect();
                println!("{}", Table::new(rows));
            }
            Ok(())
        }
        Command::Log { id } => {
            let log = client
                .log(&id)
                .get()
                .await?
                .ok_or_else(|| not_found("log", &id))?;
            print!("{log}");
            Ok(())
        }
        Command::Dispatches {
            webhook,
            offset,
            limit,
        } => {
            let query = ListQuery {
                offset,
                limit,
                ..Default::default()
            };
            let page = client.webhook(&webhook).dispatches().list(&query).await?;
            output_page(&page, json, |x| DispatchRow::from(x))
        }
    }
}

async fn handle_get(
    client: &ApifyClient,
    entity: Entity,
    id: &str,
    json: bool,
) -> apify_client::Result<()> {
    match entity {
        Entity::Dataset => {
            let dataset = client.dataset(id).get().await?;
            output_single(dataset, "dataset", id, json)
        }
        Entity::KeyValueStore => {
            let store = client.key_value_store(id).get().await?;
            output_single(store, "key-value store", id, json)
        }
        Entity::RequestQueue => {
            let queue = client.request_queue(id, None).get().await?;
            output_single(queue, "request queue", id, json)
        }
        Entity::Webhook => {
            let webhook = client.webhook(id).get().await?;
            output_single(webhook, "webhook", id, json)
        }
        Entity::WebhookDispatch => {
            let dispatch = client.webhook_dispatch(id).get().await?;
            output_single(dispatch, "webhook dispatch", id, json)
        }
    }
}

async fn handle_list(
    client: &ApifyClient,
    entity: Entity,
    offset: Option<u64>,
    limit: Option<u64>,
    desc: bool,
    json: bool,
) -> apify_client::Result<()> {
    let storage_query = StorageListQuery {
        offset,
        limit,
        desc: desc.then_some(true),
        ..Default::default()
    };
    let query = ListQuery {
        offset,
        limit,
        desc: desc.then_some(true),
    };

    match entity {
        Entity::Dataset => {
            let page = client.datasets().list(&storage_query).await?;
            output_page(&page, json, |x| DatasetRow::from(x))
        }
        Entity::KeyValueStore => {
            let page = client.key_value_stores().list(&storage_query).await?;
            output_page(&page, json, |x| KeyValueStoreRow::from(x))
        }
        Entity::RequestQueue => {
            let page = client.request_queues().list(&storage_query).await?;
            output_page(&page, json, |x| RequestQueueRow::from(x))
        }
        Entity::Webhook => {
            let page = client.webhooks().list(&query).await?;
            output_page(&page, json, |x| WebhookRow::from(x))
        }
        Entity::WebhookDispatch => {
            let page = client.webhook_dispatches().list(&query).await?;
            output_page(&page, json, |x| DispatchRow::from(x))
        }
    }
}

fn not_found(kind: &str, id: &str) -> ApifyError {
    ApifyError::InvalidArgument(format!("{kind} '{id}' was not found"))
}

fn write_stdout(bytes: &[u8]) -> apify_client::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|e| ApifyError::InvalidResponse(format!("failed to write output: {e}")))
}

fn output_single<T>(item: Option<T>, kind: &str, id: &str, json: bool) -> apify_client::Result<()>
where
    T: Serialize + PrettyPrint,
{
    let item = item.ok_or_else(|| not_found(kind, id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &ListPage<T>, json: bool, to_row: F) -> apify_client::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        let first = if page.count == 0 { 0 } else { page.offset + 1 };
        println!(
            "\n{}-{} of {} total",
            first,
            page.offset + page.count,
            page.total
        );
    }
    Ok(())
}

// Table row types for non-JSON output

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

#[derive(Tabled)]
struct DatasetRow {
    id: String,
    name: String,
    items: String,
}

impl From<&Dataset> for DatasetRow {
    fn from(d: &Dataset) -> Self {
        Self {
            id: d.id.clone(),
            name: or_dash(d.name.as_deref()),
            items: d.item_count.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct KeyValueStoreRow {
    id: String,
    name: String,
}

impl From<&KeyValueStore> for KeyValueStoreRow {
    fn from(s: &KeyValueStore) -> Self {
        Self {
            id: s.id.clone(),
            name: or_dash(s.name.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct RequestQueueRow {
    id: String,
    name: String,
    pending: String,
}

impl From<&RequestQueue> for RequestQueueRow {
    fn from(q: &RequestQueue) -> Self {
        Self {
            id: q.id.clone(),
            name: or_dash(q.name.as_deref()),
            pending: q
                .pending_request_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct WebhookRow {
    id: String,
    #[tabled(rename = "request url")]
    request_url: String,
    events: usize,
}

impl From<&Webhook> for WebhookRow {
    fn from(w: &Webhook) -> Self {
        Self {
            id: w.id.clone(),
            request_url: or_dash(w.request_url.as_deref()),
            events: w.event_types.len(),
        }
    }
}

#[derive(Tabled)]
struct DispatchRow {
    id: String,
    webhook: String,
    status: String,
}

impl From<&WebhookDispatch> for DispatchRow {
    fn from(d: &WebhookDispatch) -> Self {
        Self {
            id: d.id.clone(),
            webhook: or_dash(d.webhook_id.as_deref()),
            status: or_dash(d.status.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct KeyRow {
    key: String,
    size: u64,
}

impl From<&KeyInfo> for KeyRow {
    fn from(k: &KeyInfo) -> Self {
        Self {
            key: k.key.clone(),
            size: k.size,
        }
    }
}

#[derive(Tabled)]
struct RequestRow {
    id: String,
    url: String,
    method: String,
}

impl From<&Request> for RequestRow {
    fn from(r: &Request) -> Self {
        Self {
            id: or_dash(r.id.as_deref()),
            url: r.url.clone(),
            method: r.method.clone().unwrap_or_else(|| "GET".to_string()),
        }
    }
}
