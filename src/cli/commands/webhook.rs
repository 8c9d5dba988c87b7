//! Webhook command implementation
//!
//! Dispatches a webhook event read from a file (or `-` for stdin) through the
//! logging handler.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::{WebhookDispatcher, WebhookEvent, WebhookOutcome};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the webhook command
#[derive(Args, Debug)]
pub struct WebhookArgs {
    /// JSON file with `{type, data, timestamp}`, or `-` for stdin
    pub file: PathBuf,
}

impl WebhookArgs {
    /// Execute the webhook command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let body = if self.file.as_os_str() == "-" {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        } else {
            match std::fs::read_to_string(&self.file) {
                Ok(body) => body,
                Err(e) => {
                    println!("❌ Failed to read {}: {e}", self.file.display());
                    return Ok(EXIT_CONFIG);
                }
            }
        };

        let event = match WebhookEvent::from_json(&body) {
            Ok(event) => event,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        match WebhookDispatcher::default().dispatch(&event).await {
            Ok(WebhookOutcome::Handled(kind)) => {
                println!("✅ Handled {kind} event");
                Ok(EXIT_SUCCESS)
            }
            Ok(WebhookOutcome::Ignored(event_type)) => {
                println!("ℹ️  Ignored unknown event type '{event_type}'");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Webhook handler failed: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
