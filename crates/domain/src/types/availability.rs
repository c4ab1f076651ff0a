//! Availability wire types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A contiguous span of days with uniform availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub available: bool,
}

/// Availability calendar for a property or a single room type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCalendar {
    pub property_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<i64>,
    pub periods: Vec<AvailabilityPeriod>,
}
