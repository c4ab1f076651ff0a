//! Bookings module.

use std::any::Any;

use rentora_domain::{
    Booking, BookingFilter, BookingUpdate, NewBooking, Page, Quote, QuoteRequest, RentoraError,
    Result,
};

use super::{ensure_date_order, ensure_not_blank, ensure_positive_id, to_body, to_params, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v2/bookings`.
#[derive(Clone)]
pub struct BookingsApi {
    ctx: ModuleContext,
}

impl BookingsApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/bookings", ApiVersion::V2) }
    }

    /// List bookings matching the filter.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Page<Booking>> {
        self.ctx.get("", Some(to_params(filter)?)).await
    }

    /// Fetch a single booking.
    pub async fn get(&self, booking_id: i64) -> Result<Booking> {
        ensure_positive_id("booking id", booking_id)?;
        self.ctx.get(&format!("/{booking_id}"), None).await
    }

    /// Create a booking.
    pub async fn create(&self, booking: &NewBooking) -> Result<Booking> {
        ensure_positive_id("property id", booking.property_id)?;
        ensure_not_blank("guest name", &booking.guest.name)?;
        ensure_date_order("arrival", booking.arrival, "departure", booking.departure, true)?;
        if let Some(room_type_id) = booking.room_type_id {
            ensure_positive_id("room type id", room_type_id)?;
        }
        self.ctx.post("", to_body(booking)?).await
    }

    /// Apply a partial update to a booking.
    pub async fn update(&self, booking_id: i64, update: &BookingUpdate) -> Result<Booking> {
        ensure_positive_id("booking id", booking_id)?;
        if let (Some(arrival), Some(departure)) = (update.arrival, update.departure) {
            ensure_date_order("arrival", arrival, "departure", departure, true)?;
        }
        self.ctx.put(&format!("/{booking_id}"), to_body(update)?).await
    }

    /// Delete a booking.
    pub async fn delete(&self, booking_id: i64) -> Result<()> {
        ensure_positive_id("booking id", booking_id)?;
        self.ctx.delete(&format!("/{booking_id}")).await
    }

    /// Price a prospective stay without creating a booking.
    pub async fn quote(&self, property_id: i64, request: &QuoteRequest) -> Result<Quote> {
        ensure_positive_id("property id", property_id)?;
        ensure_date_order("arrival", request.arrival, "departure", request.departure, true)?;
        if request.guest_breakdown.adults == 0 {
            return Err(RentoraError::Validation("a quote requires at least one adult".into()));
        }
        self.ctx.get(&format!("/{property_id}/quote"), Some(to_params(request)?)).await
    }
}

impl ApiModule for BookingsApi {
    fn name(&self) -> &'static str {
        "bookings"
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
    use chrono::NaiveDate;
    use rentora_domain::{GuestBreakdown, GuestInfo};

    use super::*;
    use crate::config::ClientConfig;

    fn client() -> RentoraClient {
        RentoraClient::new(ClientConfig::builder("test-key").build().unwrap()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_booking() -> NewBooking {
        NewBooking {
            property_id: 42,
            room_type_id: None,
            arrival: date("2026-06-01"),
            departure: date("2026-06-08"),
            guest: GuestInfo { name: "Ada Lovelace".into(), email: None, phone: None },
            guest_breakdown: None,
            source: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_inverted_stay_dates() {
        let api = client().bookings();
        let mut booking = new_booking();
        booking.departure = booking.arrival;

        let err = api.create(&booking).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_guest_name() {
        let api = client().bookings();
        let mut booking = new_booking();
        booking.guest.name = "  ".into();

        let err = api.create(&booking).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }

    #[tokio::test]
    async fn quote_requires_an_adult() {
        let api = client().bookings();
        let request = QuoteRequest {
            arrival: date("2026-06-01"),
            departure: date("2026-06-08"),
            guest_breakdown: GuestBreakdown { adults: 0, children: 2, infants: 0 },
            room_type_id: None,
        };

        let err = api.quote(42, &request).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }
}
