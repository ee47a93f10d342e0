use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, NaiveDateTime};
use futures::StreamExt;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use crate::availability::hour_mark;
use crate::backend::BookingBackend;
use crate::error::{ApiError, ApiErrorCode, BackendError};
use crate::types::{Booking, BookingRequest, BookingStatus, Place, PlaceType, TimeSlot};

pub fn day(ymd: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap()
}

pub fn at(year: i32, month: u32, day_of_month: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day_of_month)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A confirmed whole-hour booking.
pub fn hour_booking(place_id: Uuid, date: NaiveDate, start_hour: u32, end_hour: u32) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        place_id,
        user_id: None,
        team_id: None,
        start_time: hour_mark(date, start_hour),
        end_time: hour_mark(date, end_hour),
        status: BookingStatus::Confirmed,
        place_name: None,
        team_name: None,
        user_name: None,
        created_at: None,
    }
}

/// An available slot as the calculator would emit it.
pub fn hour_slot(place_id: Uuid, date: NaiveDate, hour: u32) -> TimeSlot {
    TimeSlot {
        id: TimeSlot::slot_id(place_id, hour),
        place_id,
        start_time: hour_mark(date, hour),
        end_time: hour_mark(date, hour + 1),
        is_available: true,
        conflicting_booking_id: None,
    }
}

pub fn place_named(name: &str) -> Place {
    Place {
        id: Uuid::new_v4(),
        name: name.to_string(),
        location: "Downtown".into(),
        place_type: PlaceType::Eleven,
        image_url: None,
        description: None,
    }
}

pub async fn read_from_slot_stream(stream: &mut WatchStream<Vec<TimeSlot>>) -> Vec<TimeSlot> {
    stream.next().await.unwrap()
}

pub struct RecordingBackendInner {
    pub success: AtomicBool,
    pub calls_to_place_bookings: AtomicU64,
    pub calls_to_create_booking: AtomicU64,
    pub bookings: Mutex<Vec<Booking>>,
    pub created: Mutex<Vec<BookingRequest>>,
}

/// Counting fake backend. Bookings are whatever was stored via
/// [`RecordingBackend::store_booking`]; creations are recorded and echoed
/// back. Flip `success` off to make every call fail.
#[derive(Clone)]
pub struct RecordingBackend(pub Arc<RecordingBackendInner>);

impl RecordingBackend {
    pub fn new() -> Self {
        Self(Arc::new(RecordingBackendInner {
            success: AtomicBool::new(true),
            calls_to_place_bookings: AtomicU64::default(),
            calls_to_create_booking: AtomicU64::default(),
            bookings: Mutex::default(),
            created: Mutex::default(),
        }))
    }

    pub fn store_booking(&self, booking: Booking) {
        self.0.bookings.lock().unwrap().push(booking);
    }

    fn result(&self) -> Result<(), BackendError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::Api(ApiError::from(
                ApiErrorCode::InternalError,
            ))),
        }
    }
}

#[async_trait::async_trait]
impl BookingBackend for RecordingBackend {
    async fn places(&self) -> Result<Vec<Place>, BackendError> {
        self.result()?;
        Ok(Vec::new())
    }

    async fn place_bookings(&self, _place_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        self.0
            .calls_to_place_bookings
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self.0.bookings.lock().unwrap().clone())
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, BackendError> {
        self.0
            .calls_to_create_booking
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;

        let booking = Booking {
            id: Uuid::new_v4(),
            place_id: request.place_id,
            user_id: Some(request.user_id),
            team_id: Some(request.team_id),
            start_time: request.start_time,
            end_time: request.end_time,
            status: request.status,
            place_name: request.place_name.clone(),
            team_name: request.team_name.clone(),
            user_name: request.user_name.clone(),
            created_at: None,
        };
        self.0.created.lock().unwrap().push(request.clone());
        self.0.bookings.lock().unwrap().push(booking.clone());
        Ok(booking)
    }
}
