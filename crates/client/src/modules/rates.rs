//! Rates module.
//!
//! Reads live under v2; the rate-update endpoint is still v1-only and the
//! module overrides the version for that single call.

use std::any::Any;

use chrono::NaiveDate;
use rentora_domain::{DailyRate, RateSettings, RateUpdate, Result};
use reqwest::Method;
use serde_json::json;

use super::{ensure_date_order, ensure_positive_id, to_body, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v2/rates` (writes via `/v1/rates`).
#[derive(Clone)]
pub struct RatesApi {
    ctx: ModuleContext,
}

impl RatesApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/rates", ApiVersion::V2) }
    }

    /// Nightly rates for a room type over a date range.
    pub async fn daily(
        &self,
        property_id: i64,
        room_type_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRate>> {
        ensure_positive_id("property id", property_id)?;
        ensure_positive_id("room type id", room_type_id)?;
        ensure_date_order("from", from, "to", to, false)?;

        let params = json!({
            "propertyId": property_id,
            "roomTypeId": room_type_id,
            "from": from,
            "to": to,
        });
        self.ctx.get("/daily", Some(params)).await
    }

    /// Property-level rate configuration.
    pub async fn settings(&self, property_id: i64) -> Result<RateSettings> {
        ensure_positive_id("property id", property_id)?;
        self.ctx.get("/settings", Some(json!({ "propertyId": property_id }))).await
    }

    /// Update rates over a date range.
    pub async fn update(&self, update: &RateUpdate) -> Result<()> {
        ensure_positive_id("property id", update.property_id)?;
        ensure_positive_id("room type id", update.room_type_id)?;
        ensure_date_order("from", update.from, "to", update.to, false)?;

        let options = self
            .ctx
            .options_with_version(ApiVersion::V1)
            .body(to_body(update)?);
        let _: serde_json::Value = self.ctx.send(Method::PUT, "", options).await?;
        Ok(())
    }
}

impl ApiModule for RatesApi {
    fn name(&self) -> &'static str {
        "rates"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use rentora_domain::RentoraError;

    use super::*;
    use crate::config::ClientConfig;

    fn client() -> RentoraClient {
        RentoraClient::new(ClientConfig::builder("test-key").build().unwrap()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn daily_rejects_inverted_ranges() {
        let api = client().rates();

        let err = api
            .daily(42, 7, date("2026-07-01"), date("2026-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }

    #[tokio::test]
    async fn update_validates_ids_before_any_network_call() {
        let api = client().rates();
        let update = RateUpdate {
            property_id: 0,
            room_type_id: 7,
            from: date("2026-06-01"),
            to: date("2026-06-30"),
            price_per_day: 120.0,
            min_stay: Some(2),
        };

        let err = api.update(&update).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }
}
