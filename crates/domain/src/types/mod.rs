//! Domain types for the Rentora API, grouped by resource family.
//!
//! All wire types use `camelCase` field names to match the API. List
//! endpoints return a [`Page`] envelope.

pub mod availability;
pub mod bookings;
pub mod messaging;
pub mod properties;
pub mod rates;
pub mod webhooks;

use serde::{Deserialize, Serialize};

pub use availability::{AvailabilityCalendar, AvailabilityPeriod};
pub use bookings::{
    Booking, BookingFilter, BookingStatus, BookingUpdate, GuestBreakdown, GuestInfo, NewBooking,
    Quote, QuoteLine, QuoteRequest,
};
pub use messaging::{Message, MessageDirection, MessageThread, NewMessage, ThreadFilter};
pub use properties::{Address, Property, PropertyFilter, RoomType};
pub use rates::{DailyRate, RateSettings, RateUpdate};
pub use webhooks::{Webhook, WebhookSubscription, WEBHOOK_EVENTS};

/// Paged list envelope used by collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total item count across pages, when the API reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
