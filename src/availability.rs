use crate::types::{Booking, TimeSlot};
use chrono::{Days, NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Daily opening window of a place: the half-open hourly grid
/// `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    start_hour: u32,
    end_hour: u32,
}

impl OperatingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour: start_hour.min(24),
            end_hour: end_hour.min(24),
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    fn grid(&self) -> std::ops::Range<u32> {
        self.start_hour..self.end_hour
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 24,
        }
    }
}

/// Computes the full slot grid of `place_id` on `date`.
///
/// `existing_bookings` may contain bookings for other dates; only those
/// starting on `date` with a status other than cancelled block slots.
/// When `date` is the current day, slots starting at or before `now` are
/// dropped from the output entirely rather than marked unavailable, so the
/// length of the result varies with `now`.
///
/// Pure function. `now` is injected by the caller, never read from a clock.
pub fn compute_slots(
    place_id: Uuid,
    date: NaiveDate,
    existing_bookings: &[Booking],
    operating_hours: OperatingHours,
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    let same_day: Vec<&Booking> = existing_bookings
        .iter()
        .filter(|booking| booking.start_time.date() == date && booking.blocks_slots())
        .collect();

    let mut slots = Vec::new();
    for hour in operating_hours.grid() {
        let start_time = hour_mark(date, hour);
        let end_time = hour_mark(date, hour + 1);

        if date == now.date() && start_time <= now {
            continue;
        }

        let mut is_available = true;
        let mut conflicting_booking_id = None;
        for booking in &same_day {
            if start_time < booking.end_time && end_time > booking.start_time {
                is_available = false;
                // Later overlaps overwrite earlier ones.
                conflicting_booking_id = Some(booking.id);
            }
        }

        slots.push(TimeSlot {
            id: TimeSlot::slot_id(place_id, hour),
            place_id,
            start_time,
            end_time,
            is_available,
            conflicting_booking_id,
        });
    }
    slots
}

// Hour 24 is the midnight that ends the day, so it lands on the next civil
// date. Hours are clamped to 0..=24 by OperatingHours.
pub fn hour_mark(date: NaiveDate, hour: u32) -> NaiveDateTime {
    let (date, hour) = match hour {
        24.. => (date + Days::new(1), hour - 24),
        _ => (date, hour),
    };
    date.and_hms_opt(hour, 0, 0).expect("hour is below 24")
}
