//! Rate wire types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Nightly rate for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRate {
    pub date: NaiveDate,
    pub price_per_day: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// Property-level rate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSettings {
    pub property_id: i64,
    pub currency_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_price_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_notice_days: Option<u32>,
}

/// Write payload for updating rates over a date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateUpdate {
    pub property_id: i64,
    pub room_type_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub price_per_day: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stay: Option<u32>,
}
