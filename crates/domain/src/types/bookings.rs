//! Booking and quote wire types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingStatus {
    Open,
    Tentative,
    Booked,
    Declined,
    Closed,
}

/// Primary guest contact information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Guest head-count split.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBreakdown {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

/// A booking as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub property_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<i64>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub status: BookingStatus,
    pub guest: GuestInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_breakdown: Option<GuestBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub property_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<i64>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub guest: GuestInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_breakdown: Option<GuestBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Partial update of an existing booking.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

/// Query filter for listing bookings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Stay parameters for a price quote. Serialized into query parameters;
/// the nested breakdown flattens to `guestBreakdown[adults]` style keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub guest_breakdown: GuestBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<i64>,
}

/// One line of a quote (fee, tax, discount).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub description: String,
    pub amount: f64,
}

/// A price quote for a prospective stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub currency_code: String,
    pub subtotal: f64,
    #[serde(default)]
    pub lines: Vec<QuoteLine>,
    pub total: f64,
}
