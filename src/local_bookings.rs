use crate::availability::hour_mark;
use crate::backend::BookingBackend;
use crate::error::{ApiError, ApiErrorCode, BackendError};
use crate::types::{Booking, BookingRequest, BookingStatus, Place, PlaceType};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// In-memory stand-in for the platform backend, used by the demo binary when
/// no API base URL is configured. Behaves like the real service where the
/// client can tell the difference: unknown places and double-booked slots
/// are rejected with the same numeric error codes.
#[derive(Debug, Clone, Default)]
pub struct LocalBookings {
    places: Arc<Mutex<HashMap<Uuid, Place>>>,
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    places: Vec<Place>,
    bookings: Vec<Booking>,
}

impl LocalBookings {
    /// Seeds a handful of places and bookings around `date` so the demo has
    /// something to show.
    pub fn insert_example_data(&self, date: NaiveDate) {
        let mut places = self.places.lock().unwrap();
        let mut bookings = self.bookings.lock().unwrap();

        let arena = Place {
            id: Uuid::new_v4(),
            name: "City Arena".into(),
            location: "Downtown".into(),
            place_type: PlaceType::Eleven,
            image_url: None,
            description: Some("Full-size pitch with floodlights".into()),
        };
        let cage = Place {
            id: Uuid::new_v4(),
            name: "Riverside Cage".into(),
            location: "East Bank".into(),
            place_type: PlaceType::Five,
            image_url: None,
            description: None,
        };

        let mut seed = |place: &Place, day: NaiveDate, start: u32, end: u32, status: BookingStatus| {
            let id = Uuid::new_v4();
            bookings.insert(
                id,
                Booking {
                    id,
                    place_id: place.id,
                    user_id: None,
                    team_id: None,
                    start_time: hour_mark(day, start),
                    end_time: hour_mark(day, end),
                    status,
                    place_name: Some(place.name.clone()),
                    team_name: None,
                    user_name: None,
                    created_at: None,
                },
            );
        };

        seed(&arena, date, 10, 12, BookingStatus::Confirmed);
        seed(&arena, date, 18, 19, BookingStatus::PendingPlayers);
        seed(&arena, date, 14, 16, BookingStatus::Cancelled);
        seed(&cage, date + Days::new(1), 9, 10, BookingStatus::Confirmed);

        places.insert(arena.id, arena);
        places.insert(cage.id, cage);
    }

    /// Loads a previously saved state. A missing file is not an error, the
    /// store simply starts empty.
    pub fn init_from_file(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }

        let contents = fs::read_to_string(path)?;
        let state: StoredState = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            places = state.places.len(),
            bookings = state.bookings.len(),
            "loaded stored bookings"
        );

        *self.places.lock().unwrap() = state
            .places
            .into_iter()
            .map(|place| (place.id, place))
            .collect();
        *self.bookings.lock().unwrap() = state
            .bookings
            .into_iter()
            .map(|booking| (booking.id, booking))
            .collect();
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        let state = StoredState {
            places: self.places.lock().unwrap().values().cloned().collect(),
            bookings: self.bookings.lock().unwrap().values().cloned().collect(),
        };

        let contents = serde_json::to_string_pretty(&state)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "saved bookings");
        Ok(())
    }
}

#[async_trait::async_trait]
impl BookingBackend for LocalBookings {
    async fn places(&self) -> Result<Vec<Place>, BackendError> {
        let mut places: Vec<Place> = self.places.lock().unwrap().values().cloned().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(places)
    }

    async fn place_bookings(&self, place_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        if !self.places.lock().unwrap().contains_key(&place_id) {
            return Err(BackendError::Api(ApiError::from(ApiErrorCode::PlaceNotFound)));
        }

        let mut bookings: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|booking| booking.place_id == place_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.start_time);
        Ok(bookings)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, BackendError> {
        if request.start_time >= request.end_time {
            return Err(BackendError::Api(ApiError::from(
                ApiErrorCode::InvalidBookingStartTime,
            )));
        }

        let place_name = match self.places.lock().unwrap().get(&request.place_id) {
            Some(place) => place.name.clone(),
            None => {
                return Err(BackendError::Api(ApiError::from(ApiErrorCode::PlaceNotFound)))
            }
        };

        let mut bookings = self.bookings.lock().unwrap();
        let taken = bookings.values().any(|booking| {
            booking.place_id == request.place_id
                && booking.blocks_slots()
                && request.start_time < booking.end_time
                && request.end_time > booking.start_time
        });
        if taken {
            return Err(BackendError::Api(ApiError::from(
                ApiErrorCode::TimeSlotUnavailable,
            )));
        }

        let id = Uuid::new_v4();
        let booking = Booking {
            id,
            place_id: request.place_id,
            user_id: Some(request.user_id),
            team_id: Some(request.team_id),
            start_time: request.start_time,
            end_time: request.end_time,
            status: request.status,
            place_name: Some(place_name),
            team_name: request.team_name.clone(),
            user_name: request.user_name.clone(),
            created_at: None,
        };
        bookings.insert(id, booking.clone());
        info!(booking_id = %id, place_id = %request.place_id, "created local booking");
        Ok(booking)
    }
}
