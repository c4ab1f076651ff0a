//! Domain API modules.
//!
//! Each module is a concrete type wrapping a [`ModuleContext`]: the
//! module's base path, its API version, and a non-owning handle back to
//! the orchestrator. Module methods validate their inputs locally (zero
//! network cost for bad arguments), then translate into generic requests
//! through the context helpers.

pub mod availability;
pub mod bookings;
pub mod messaging;
pub mod properties;
pub mod rates;
pub mod webhooks;

use std::sync::Weak;

use chrono::NaiveDate;
use rentora_domain::{RentoraError, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use availability::AvailabilityApi;
pub use bookings::BookingsApi;
pub use messaging::MessagingApi;
pub use properties::PropertiesApi;
pub use rates::RatesApi;
pub use webhooks::WebhooksApi;

use crate::client::{ClientInner, RentoraClient, RequestOptions};
use crate::config::ApiVersion;

/// Shared plumbing for a domain module: base path, version, and a
/// non-owning back-reference to the orchestrator.
#[derive(Clone)]
pub(crate) struct ModuleContext {
    client: Weak<ClientInner>,
    base_path: &'static str,
    version: ApiVersion,
}

impl ModuleContext {
    pub(crate) fn new(client: &RentoraClient, base_path: &'static str, version: ApiVersion) -> Self {
        Self { client: client.downgrade(), base_path, version }
    }

    fn client(&self) -> Result<RentoraClient> {
        self.client.upgrade().map(RentoraClient::from_inner).ok_or_else(|| {
            RentoraError::Internal("client was dropped while a module call was pending".into())
        })
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.base_path, suffix)
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::new().version(self.version)
    }

    fn options_with_version(&self, version: ApiVersion) -> RequestOptions {
        RequestOptions::new().version(version)
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        suffix: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.client()?.request(method, &self.path(suffix), options).await
    }

    async fn get<T: DeserializeOwned>(&self, suffix: &str, params: Option<Value>) -> Result<T> {
        let mut options = self.options();
        if let Some(params) = params {
            options = options.params(params);
        }
        self.send(Method::GET, suffix, options).await
    }

    async fn post<T: DeserializeOwned>(&self, suffix: &str, body: Value) -> Result<T> {
        self.send(Method::POST, suffix, self.options().body(body)).await
    }

    async fn put<T: DeserializeOwned>(&self, suffix: &str, body: Value) -> Result<T> {
        self.send(Method::PUT, suffix, self.options().body(body)).await
    }

    async fn delete(&self, suffix: &str) -> Result<()> {
        let _: Value = self.send(Method::DELETE, suffix, self.options()).await?;
        Ok(())
    }
}

pub(crate) fn to_params<T: Serialize>(filter: &T) -> Result<Value> {
    serde_json::to_value(filter)
        .map_err(|err| RentoraError::Internal(format!("failed to serialize parameters: {err}")))
}

pub(crate) fn to_body<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload)
        .map_err(|err| RentoraError::Internal(format!("failed to serialize body: {err}")))
}

pub(crate) fn ensure_positive_id(field: &str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(RentoraError::Validation(format!("{field} must be a positive id, got {id}")));
    }
    Ok(())
}

pub(crate) fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RentoraError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// `strict` requires `earlier < later`; otherwise `earlier <= later`.
pub(crate) fn ensure_date_order(
    earlier_field: &str,
    earlier: NaiveDate,
    later_field: &str,
    later: NaiveDate,
    strict: bool,
) -> Result<()> {
    let out_of_order = if strict { earlier >= later } else { earlier > later };
    if out_of_order {
        return Err(RentoraError::Validation(format!(
            "{earlier_field} ({earlier}) must be before {later_field} ({later})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn positive_id_validation() {
        assert!(ensure_positive_id("property id", 1).is_ok());
        assert!(matches!(
            ensure_positive_id("property id", 0),
            Err(RentoraError::Validation(_))
        ));
        assert!(ensure_positive_id("property id", -5).is_err());
    }

    #[test]
    fn blank_string_validation() {
        assert!(ensure_not_blank("guest name", "Ada").is_ok());
        assert!(ensure_not_blank("guest name", "   ").is_err());
    }

    #[test]
    fn date_order_validation() {
        let a = date("2026-06-01");
        let b = date("2026-06-08");

        assert!(ensure_date_order("arrival", a, "departure", b, true).is_ok());
        assert!(ensure_date_order("arrival", a, "departure", a, true).is_err());
        assert!(ensure_date_order("from", a, "to", a, false).is_ok());
        assert!(ensure_date_order("from", b, "to", a, false).is_err());
    }
}
