//! Webhooks module. The webhook endpoints are still v1-only.

use std::any::Any;

use rentora_domain::{Page, RentoraError, Result, Webhook, WebhookSubscription};

use super::{ensure_positive_id, to_body, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v1/webhooks`.
#[derive(Clone)]
pub struct WebhooksApi {
    ctx: ModuleContext,
}

impl WebhooksApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/webhooks", ApiVersion::V1) }
    }

    /// List active subscriptions.
    pub async fn list(&self) -> Result<Page<Webhook>> {
        self.ctx.get("", None).await
    }

    /// Subscribe a target URL to an event.
    pub async fn subscribe(&self, subscription: &WebhookSubscription) -> Result<Webhook> {
        if !WebhookSubscription::is_known_event(&subscription.event) {
            return Err(RentoraError::Validation(format!(
                "unknown webhook event: {}",
                subscription.event
            )));
        }
        let target = url::Url::parse(&subscription.target_url)
            .map_err(|e| RentoraError::Validation(format!("invalid target url: {e}")))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(RentoraError::Validation(format!(
                "target url must be http(s), got {}",
                target.scheme()
            )));
        }

        self.ctx.post("", to_body(subscription)?).await
    }

    /// Remove a subscription.
    pub async fn unsubscribe(&self, webhook_id: i64) -> Result<()> {
        ensure_positive_id("webhook id", webhook_id)?;
        self.ctx.delete(&format!("/{webhook_id}")).await
    }
}

impl ApiModule for WebhooksApi {
    fn name(&self) -> &'static str {
        "webhooks"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::V1
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client() -> RentoraClient {
        RentoraClient::new(ClientConfig::builder("test-key").build().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn rejects_unknown_events() {
        let api = client().webhooks();
        let sub = WebhookSubscription {
            event: "booking.exploded".into(),
            target_url: "https://example.com/hook".into(),
        };

        let err = api.subscribe(&sub).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_target_urls() {
        let api = client().webhooks();
        let sub = WebhookSubscription {
            event: "booking.created".into(),
            target_url: "ftp://example.com/hook".into(),
        };

        let err = api.subscribe(&sub).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }
}
