use crate::error::BackendError;
use crate::types::{Booking, BookingRequest, Place};
use uuid::Uuid;

/// Seam to whatever owns the booking data. Implemented by the HTTP client,
/// the local in-memory store, and the caching decorator wrapping either.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BookingBackend: Send + Sync + 'static {
    /// All bookable places.
    async fn places(&self) -> Result<Vec<Place>, BackendError>;

    /// Every booking of one place, across all dates.
    async fn place_bookings(&self, place_id: Uuid) -> Result<Vec<Booking>, BackendError>;

    /// Creates one booking and returns it as the backend recorded it.
    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, BackendError>;
}
