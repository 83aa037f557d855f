//! CLI argument parsing tests.

use apify_client::cli::{Cli, Command, Entity};
use apify_client::ItemFormat;
use clap::Parser;

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["apify", "get", "dataset", "someone/products"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { entity, id } => {
            assert_eq!(entity, Entity::Dataset);
            assert_eq!(id, "someone/products");
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_with_paging() {
    let cli = Cli::parse_from([
        "apify", "list", "webhooks", "--offset", "10", "--limit", "5", "--desc",
    ]);

    match cli.command {
        Command::List {
            entity,
            offset,
            limit,
            desc,
        } => {
            assert_eq!(entity, Entity::Webhook);
            assert_eq!(offset, Some(10));
            assert_eq!(limit, Some(5));
            assert!(desc);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_entity_aliases() {
    for (alias, expected) in [
        ("datasets", Entity::Dataset),
        ("kvs", Entity::KeyValueStore),
        ("key-value-stores", Entity::KeyValueStore),
        ("queue", Entity::RequestQueue),
        ("dispatch", Entity::WebhookDispatch),
    ] {
        let cli = Cli::parse_from(["apify", "get", alias, "x"]);
        match cli.command {
            Command::Get { entity, .. } => assert_eq!(entity, expected, "alias {alias}"),
            _ => panic!("Expected Get command"),
        }
    }
}

#[test]
fn test_cli_parses_items_fields() {
    let cli = Cli::parse_from([
        "apify", "items", "ds1", "--fields", "sku,price", "--clean", "--limit", "100",
    ]);

    match cli.command {
        Command::Items {
            dataset,
            offset,
            limit,
            fields,
            clean,
        } => {
            assert_eq!(dataset, "ds1");
            assert_eq!(offset, 0);
            assert_eq!(limit, Some(100));
            assert_eq!(fields, vec!["sku", "price"]);
            assert!(clean);
        }
        _ => panic!("Expected Items command"),
    }
}

#[test]
fn test_cli_parses_download_format() {
    let cli = Cli::parse_from(["apify", "download", "ds1", "--format", "csv"]);

    match cli.command {
        Command::Download { format, .. } => assert_eq!(format, ItemFormat::Csv),
        _ => panic!("Expected Download command"),
    }

    assert!(Cli::try_parse_from(["apify", "download", "ds1", "--format", "yaml"]).is_err());
}

#[test]
fn test_json_flag_is_global() {
    let cli = Cli::parse_from(["apify", "keys", "kvs1", "--json"]);
    assert!(cli.json);

    let cli = Cli::parse_from(["apify", "--json", "log", "run1"]);
    assert!(cli.json);
    assert!(matches!(cli.command, Command::Log { ref id } if id == "run1"));
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["apify"]).is_err());
}
