//! Inbound webhook dispatch
//!
//! Events arrive as `{type, data, timestamp}`. Known types route to the
//! matching [`WebhookHandler`] method; unknown types are logged and ignored
//! so that new event types from the sender do not cause failures.

use crate::domain::{FhirsyncError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Webhook payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub data: Value,

    /// RFC 3339 string or epoch milliseconds on the wire; unreadable values become `None`
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(timestamp)
}

impl WebhookEvent {
    /// Parses an event from its JSON body
    ///
    /// # Errors
    ///
    /// Returns a webhook error if the body is not a valid event
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| FhirsyncError::Webhook(format!("Invalid webhook payload: {e}")))
    }
}

/// Event types with a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    CycleUpdated,
    LabResult,
    AppointmentUpdated,
    ProcedureScheduled,
}

impl WebhookEventKind {
    /// Maps a wire `type` value, `None` for unknown types
    pub fn from_type(event_type: &str) -> Option<Self> {
        match event_type {
            "cycle.updated" => Some(Self::CycleUpdated),
            "lab.result" => Some(Self::LabResult),
            "appointment.updated" => Some(Self::AppointmentUpdated),
            "procedure.scheduled" => Some(Self::ProcedureScheduled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleUpdated => "cycle.updated",
            Self::LabResult => "lab.result",
            Self::AppointmentUpdated => "appointment.updated",
            Self::ProcedureScheduled => "procedure.scheduled",
        }
    }
}

impl fmt::Display for WebhookEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the dispatcher did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Handled(WebhookEventKind),
    /// Unknown type, carried verbatim
    Ignored(String),
}

/// Receives routed webhook events
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn cycle_updated(&self, event: &WebhookEvent) -> Result<()>;

    async fn lab_result(&self, event: &WebhookEvent) -> Result<()>;

    async fn appointment_updated(&self, event: &WebhookEvent) -> Result<()>;

    async fn procedure_scheduled(&self, event: &WebhookEvent) -> Result<()>;
}

/// Handler that records each event in the log
#[derive(Debug, Default)]
pub struct LoggingWebhookHandler;

impl LoggingWebhookHandler {
    fn log(kind: WebhookEventKind, event: &WebhookEvent) {
        let id = event
            .data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        tracing::info!(
            event_type = kind.as_str(),
            id = id,
            timestamp = ?event.timestamp,
            "Webhook event received"
        );
    }
}

#[async_trait]
impl WebhookHandler for LoggingWebhookHandler {
    async fn cycle_updated(&self, event: &WebhookEvent) -> Result<()> {
        Self::log(WebhookEventKind::CycleUpdated, event);
        Ok(())
    }

    async fn lab_result(&self, event: &WebhookEvent) -> Result<()> {
        Self::log(WebhookEventKind::LabResult, event);
        Ok(())
    }

    async fn appointment_updated(&self, event: &WebhookEvent) -> Result<()> {
        Self::log(WebhookEventKind::AppointmentUpdated, event);
        Ok(())
    }

    async fn procedure_scheduled(&self, event: &WebhookEvent) -> Result<()> {
        Self::log(WebhookEventKind::ProcedureScheduled, event);
        Ok(())
    }
}

/// Routes events to a handler by type
pub struct WebhookDispatcher {
    handler: Arc<dyn WebhookHandler>,
}

impl WebhookDispatcher {
    pub fn new(handler: Arc<dyn WebhookHandler>) -> Self {
        Self { handler }
    }

    /// Dispatches one event
    ///
    /// # Errors
    ///
    /// Returns the handler's error; unknown types are not an error
    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        let Some(kind) = WebhookEventKind::from_type(&event.event_type) else {
            tracing::warn!(event_type = %event.event_type, "Ignoring unknown webhook event type");
            return Ok(WebhookOutcome::Ignored(event.event_type.clone()));
        };

        match kind {
            WebhookEventKind::CycleUpdated => self.handler.cycle_updated(event).await?,
            WebhookEventKind::LabResult => self.handler.lab_result(event).await?,
            WebhookEventKind::AppointmentUpdated => self.handler.appointment_updated(event).await?,
            WebhookEventKind::ProcedureScheduled => self.handler.procedure_scheduled(event).await?,
        }

        Ok(WebhookOutcome::Handled(kind))
    }
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(LoggingWebhookHandler))
    }
}
