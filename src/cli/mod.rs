//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the apify binary.

use clap::{Parser, Subcommand, ValueEnum};

use crate::ItemFormat;

/// Apify API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "apify", about = "Apify API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID or `username/name`.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity ID.
        id: String,
    },

    /// List entities with offset pagination.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Number of entries to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Maximum number of entries to return.
        #[arg(long)]
        limit: Option<u64>,

        /// Newest first.
        #[arg(long)]
        desc: bool,
    },

    /// Print dataset items, fetching as many pages as needed.
    Items {
        /// Dataset ID.
        dataset: String,

        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum number of items to print.
        #[arg(long)]
        limit: Option<u64>,

        /// Only keep these fields (comma-separated).
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Skip empty items and hidden fields.
        #[arg(long)]
        clean: bool,
    },

    /// Export dataset items in a given format to stdout.
    Download {
        /// Dataset ID.
        dataset: String,

        /// Export format (json, jsonl, csv, html, xlsx, xml, rss).
        #[arg(long, default_value = "json")]
        format: ItemFormat,
    },

    /// Push items (a JSON object or array) to a dataset.
    Push {
        /// Dataset ID.
        dataset: String,

        /// The items as JSON.
        items: String,
    },

    /// List keys of a key-value store.
    Keys {
        /// Key-value store ID.
        store: String,

        /// Maximum number of keys to return.
        #[arg(long)]
        limit: Option<u64>,

        /// Return keys after this one.
        #[arg(long)]
        exclusive_start_key: Option<String>,
    },

    /// Print a key-value store record.
    Record {
        /// Key-value store ID.
        store: String,

        /// Record key.
        key: String,
    },

    /// Show the first pending requests of a request queue.
    Head {
        /// Request queue ID.
        queue: String,

        /// Maximum number of requests to return.
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Print the log of a build or run.
    Log {
        /// Build or run ID.
        id: String,
    },

    /// List dispatches of a webhook.
    Dispatches {
        /// Webhook ID.
        webhook: String,

        /// Number of entries to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Maximum number of entries to return.
        #[arg(long)]
        limit: Option<u64>,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A dataset.
    #[value(alias = "datasets")]
    Dataset,
    /// A key-value store.
    #[value(alias = "key-value-stores", alias = "kvs")]
    KeyValueStore,
    /// A request queue.
    #[value(alias = "request-queues", alias = "queue")]
    RequestQueue,
    /// A webhook.
    #[value(alias = "webhooks")]
    Webhook,
    /// A webhook dispatch.
    #[value(alias = "webhook-dispatches", alias = "dispatch")]
    WebhookDispatch,
}
