use crate::backend::BookingBackend;
use crate::error::BackendError;
use crate::types::{Booking, BookingRequest, Place};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Caching decorator over another backend.
///
/// Booking lists are cached per place and evicted explicitly, either through
/// [`CachedBackend::invalidate`] (the real-time "bookings changed" signal) or
/// by creating a booking for that place. The place list works differently:
/// every call goes upstream, and the last successfully fetched list is kept
/// as a fallback served when the upstream fails.
pub struct CachedBackend<T: BookingBackend> {
    inner: T,
    bookings: Mutex<HashMap<Uuid, Vec<Booking>>>,
    places: Mutex<Option<Vec<Place>>>,
}

impl<T: BookingBackend> CachedBackend<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            bookings: Mutex::default(),
            places: Mutex::default(),
        }
    }

    /// Evicts the cached booking list of one place.
    pub fn invalidate(&self, place_id: Uuid) {
        self.bookings.lock().unwrap().remove(&place_id);
    }

    /// Evicts every cached booking list.
    pub fn invalidate_all(&self) {
        self.bookings.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl<T: BookingBackend> BookingBackend for CachedBackend<T> {
    async fn places(&self) -> Result<Vec<Place>, BackendError> {
        match self.inner.places().await {
            Ok(places) => {
                *self.places.lock().unwrap() = Some(places.clone());
                Ok(places)
            }
            Err(err) => {
                let fallback = self.places.lock().unwrap().clone();
                match fallback {
                    Some(places) => {
                        warn!(?err, "place fetch failed, serving last known list");
                        Ok(places)
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn place_bookings(&self, place_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        {
            let cache = self.bookings.lock().unwrap();
            if let Some(bookings) = cache.get(&place_id) {
                debug!(%place_id, "serving cached bookings");
                return Ok(bookings.clone());
            }
        }

        let bookings = self.inner.place_bookings(place_id).await?;
        self.bookings
            .lock()
            .unwrap()
            .insert(place_id, bookings.clone());
        Ok(bookings)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, BackendError> {
        let booking = self.inner.create_booking(request).await?;
        // The cached list for this place no longer reflects the backend.
        self.invalidate(request.place_id);
        Ok(booking)
    }
}
