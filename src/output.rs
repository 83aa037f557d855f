//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{Dataset, KeyValueStore, RequestQueue, Webhook, WebhookDispatch};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header(kind: &str, id: &str) -> Vec<String> {
    let title = format!("{kind}: {id}");
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn storage_lines(
    lines: &mut Vec<String>,
    name: Option<&str>,
    created_at: Option<&DateTime<Utc>>,
    modified_at: Option<&DateTime<Utc>>,
) {
    lines.push(format!("Name:           {}", name.unwrap_or("(unnamed)")));
    if let Some(created) = created_at {
        lines.push(format!("Created:        {}", timestamp(created)));
    }
    if let Some(modified) = modified_at {
        lines.push(format!("Modified:       {}", timestamp(modified)));
    }
}

impl PrettyPrint for Dataset {
    fn pretty_print(&self) -> String {
        let mut lines = header("Dataset", &self.id);
        storage_lines(
            &mut lines,
            self.name.as_deref(),
            self.created_at.as_ref(),
            self.modified_at.as_ref(),
        );

        if let Some(count) = self.item_count {
            lines.push(format!(
                "Items:          {} ({} clean)",
                count,
                self.clean_item_count.unwrap_or(count)
            ));
        }

        if let Some(ref run) = self.act_run_id {
            lines.push(format!("Actor Run:      {}", run));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for KeyValueStore {
    fn pretty_print(&self) -> String {
        let mut lines = header("Key-value store", &self.id);
        storage_lines(
            &mut lines,
            self.name.as_deref(),
            self.created_at.as_ref(),
            self.modified_at.as_ref(),
        );

        if let Some(ref run) = self.act_run_id {
            lines.push(format!("Actor Run:      {}", run));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for RequestQueue {
    fn pretty_print(&self) -> String {
        let mut lines = header("Request queue", &self.id);
        storage_lines(
            &mut lines,
            self.name.as_deref(),
            self.created_at.as_ref(),
            self.modified_at.as_ref(),
        );

        if let Some(total) = self.total_request_count {
            lines.push(format!(
                "Requests:       {} total, {} handled, {} pending",
                total,
                self.handled_request_count.unwrap_or(0),
                self.pending_request_count.unwrap_or(0)
            ));
        }

        if self.had_multiple_clients == Some(true) {
            lines.push("Clients:        multiple".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Webhook {
    fn pretty_print(&self) -> String {
        let mut lines = header("Webhook", &self.id);

        let events: Vec<String> = self
            .event_types
            .iter()
            .map(|e| {
                serde_json::to_value(e)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            })
            .collect();
        lines.push(format!("Events:         {}", events.join(", ")));

        if let Some(ref url) = self.request_url {
            lines.push(format!("Request URL:    {}", url));
        }

        let condition = &self.condition;
        if let Some(ref run) = condition.actor_run_id {
            lines.push(format!("Actor Run:      {}", run));
        } else if let Some(ref task) = condition.actor_task_id {
            lines.push(format!("Actor Task:     {}", task));
        } else if let Some(ref actor) = condition.actor_id {
            lines.push(format!("Actor:          {}", actor));
        }

        if self.is_ad_hoc == Some(true) {
            lines.push("Ad hoc:         yes".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for WebhookDispatch {
    fn pretty_print(&self) -> String {
        let mut lines = header("Webhook dispatch", &self.id);

        if let Some(ref webhook) = self.webhook_id {
            lines.push(format!("Webhook:        {}", webhook));
        }
        if let Some(ref status) = self.status {
            lines.push(format!("Status:         {}", status));
        }
        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }
        lines.push(format!("Calls:          {}", self.calls.len()));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_pretty_print_format() {
        let dataset: Dataset = serde_json::from_value(serde_json::json!({
            "id": "WkzbQMuFYuamGv3YF",
            "itemCount": 7,
            "cleanItemCount": 5
        }))
        .unwrap();

        let output = dataset.pretty_print();
        assert!(output.starts_with("Dataset: WkzbQMuFYuamGv3YF"));
        assert!(output.contains("Name:           (unnamed)"));
        assert!(output.contains("Items:          7 (5 clean)"));
    }

    #[test]
    fn test_webhook_pretty_print_shows_condition() {
        let webhook: Webhook = serde_json::from_value(serde_json::json!({
            "id": "wh1",
            "eventTypes": ["ACTOR.RUN.FAILED"],
            "condition": {"actorTaskId": "task1"},
            "requestUrl": "https://example.com/hook"
        }))
        .unwrap();

        let output = webhook.pretty_print();
        assert!(output.contains("Events:         ACTOR.RUN.FAILED"));
        assert!(output.contains("Actor Task:     task1"));
    }
}
