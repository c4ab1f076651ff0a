//! Webhook wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event names the API can deliver.
pub const WEBHOOK_EVENTS: &[&str] = &[
    "booking.created",
    "booking.updated",
    "booking.deleted",
    "message.received",
    "rate.updated",
    "availability.updated",
];

/// An active webhook subscription as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: i64,
    pub event: String,
    pub target_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for subscribing to an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscription {
    pub event: String,
    pub target_url: String,
}

impl WebhookSubscription {
    /// Whether `event` is one of the deliverable event names.
    pub fn is_known_event(event: &str) -> bool {
        WEBHOOK_EVENTS.contains(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_events_are_recognized() {
        assert!(WebhookSubscription::is_known_event("booking.created"));
        assert!(!WebhookSubscription::is_known_event("booking.exploded"));
    }
}
