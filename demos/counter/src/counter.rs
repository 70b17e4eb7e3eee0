//! Per-key counter state.

use std::collections::HashMap;

use serde_json::{Value, json};
use streamdeck_client::PluginHandle;
use streamdeck_core::{Command, Target};
use tokio::sync::mpsc;

/// Changes reported by the event handlers.
#[derive(Debug)]
pub enum Update {
    Appeared { context: String, count: u64 },
    Pressed { context: String },
    Disappeared { context: String },
}

/// Read the stored count from an action's settings.
pub fn count_from_settings(settings: &Value) -> u64 {
    settings.get("count").and_then(Value::as_u64).unwrap_or(0)
}

#[derive(Debug, Default)]
pub struct Counters {
    counts: HashMap<String, u64>,
}

impl Counters {
    /// Apply an update, returning the key whose title needs redrawing.
    pub fn apply(&mut self, update: Update) -> Option<(String, u64)> {
        match update {
            Update::Appeared { context, count } => {
                self.counts.insert(context.clone(), count);
                Some((context, count))
            }
            Update::Pressed { context } => {
                let count = self.counts.entry(context.clone()).or_insert(0);
                *count += 1;
                Some((context, *count))
            }
            Update::Disappeared { context } => {
                self.counts.remove(&context);
                None
            }
        }
    }

    /// Consume updates until the handlers go away or a send fails.
    pub async fn run(mut self, plugin: PluginHandle, mut updates: mpsc::UnboundedReceiver<Update>) {
        while let Some(update) = updates.recv().await {
            let pressed = matches!(update, Update::Pressed { .. });
            let Some((context, count)) = self.apply(update) else {
                continue;
            };

            let title = Command::set_title(&context, count.to_string(), Target::Both, None);
            if let Err(e) = plugin.send(&title).await {
                tracing::warn!("Failed to update title: {}", e);
                break;
            }
            if pressed {
                let settings = Command::set_settings(&context, json!({"count": count}));
                if let Err(e) = plugin.send(&settings).await {
                    tracing::warn!("Failed to store count: {}", e);
                    break;
                }
            }
        }
    }
}
