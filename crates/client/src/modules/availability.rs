//! Availability module.

use std::any::Any;

use chrono::NaiveDate;
use rentora_domain::{AvailabilityCalendar, Result};
use serde_json::json;

use super::{ensure_date_order, ensure_positive_id, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v2/availability`.
#[derive(Clone)]
pub struct AvailabilityApi {
    ctx: ModuleContext,
}

impl AvailabilityApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/availability", ApiVersion::V2) }
    }

    /// Availability calendar across all room types of a property.
    pub async fn for_property(
        &self,
        property_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailabilityCalendar> {
        ensure_positive_id("property id", property_id)?;
        ensure_date_order("from", from, "to", to, false)?;

        self.ctx
            .get(&format!("/{property_id}"), Some(json!({ "from": from, "to": to })))
            .await
    }

    /// Availability calendar for one room type.
    pub async fn for_room(
        &self,
        property_id: i64,
        room_type_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailabilityCalendar> {
        ensure_positive_id("property id", property_id)?;
        ensure_positive_id("room type id", room_type_id)?;
        ensure_date_order("from", from, "to", to, false)?;

        self.ctx
            .get(
                &format!("/{property_id}/{room_type_id}"),
                Some(json!({ "from": from, "to": to })),
            )
            .await
    }
}

impl ApiModule for AvailabilityApi {
    fn name(&self) -> &'static str {
        "availability"
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
    async fn rejects_bad_ids_and_ranges_locally() {
        let api = client().availability();

        let err = api.for_property(-1, date("2026-06-01"), date("2026-06-30")).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));

        let err = api
            .for_room(42, 7, date("2026-06-30"), date("2026-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }
}
