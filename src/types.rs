use crate::error::IngestError;
use chrono::{NaiveDateTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Seconds are optional; the backend serializer drops ":00".
    static ref CIVIL_DATETIME: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    PendingPlayers,
    PendingPayment,
}

impl FromStr for BookingStatus {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "PENDING_PLAYERS" => Ok(Self::PendingPlayers),
            "PENDING_PAYMENT" => Ok(Self::PendingPayment),
            other => Err(IngestError::Status(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceType {
    Five,
    Seven,
    Eleven,
}

impl PlaceType {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Five => "5-a-side",
            Self::Seven => "7-a-side",
            Self::Eleven => "11-a-side",
        }
    }
}

impl FromStr for PlaceType {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FIVE" => Ok(Self::Five),
            "SEVEN" => Ok(Self::Seven),
            "ELEVEN" => Ok(Self::Eleven),
            other => Err(IngestError::PlaceType(other.to_string())),
        }
    }
}

/// A venue that can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub place_type: PlaceType,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// An existing booking of a place, as reported by the backend. All
/// timestamps are civil (wall-clock) time; the platform never converts
/// between timezones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Booking {
    /// A booking blocks slots unless it has been cancelled.
    pub fn blocks_slots(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// One candidate hourly interval of a place on a given day. Recomputed from
/// scratch on every calculation and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub place_id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_available: bool,
    pub conflicting_booking_id: Option<Uuid>,
}

impl TimeSlot {
    pub fn slot_id(place_id: Uuid, hour: u32) -> String {
        format!("{place_id}-{hour}")
    }

    /// The grid hour this slot starts at.
    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }
}

/// A maximal run of exactly-adjacent selected slots. Each group is submitted
/// to the backend as a single booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingGroup {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub slots: Vec<TimeSlot>,
    pub duration_hours: f64,
}

impl BookingGroup {
    pub fn format_duration(&self) -> String {
        let hours = self.duration_hours;
        if (hours - 1.0).abs() < f64::EPSILON {
            "1 hour".to_string()
        } else if hours.fract() == 0.0 {
            format!("{hours:.0} hours")
        } else {
            let whole = hours.trunc();
            let minutes = (hours.fract() * 60.0).round();
            format!("{whole:.0}h {minutes:.0}m")
        }
    }
}

/// Payload for creating one booking. The civil timestamps serialize as
/// `YYYY-MM-DDTHH:MM:SS`, which is the format the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Envelope of the backend's paginated endpoints.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
}

/// Booking record exactly as the API serializes it, all fields still
/// strings. [`Booking`] is obtained through the validating conversion below.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawBooking {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub place_id: String,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    #[validate(regex(path = *CIVIL_DATETIME))]
    pub start_time: String,
    #[validate(regex(path = *CIVIL_DATETIME))]
    pub end_time: String,
    #[validate(length(min = 1))]
    pub status: String,
    pub place_name: Option<String>,
    pub team_name: Option<String>,
    pub user_name: Option<String>,
    #[validate(regex(path = *CIVIL_DATETIME))]
    pub created_at: Option<String>,
}

/// Place record as the API serializes it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawPlace {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub place_type: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<RawBooking> for Booking {
    type Error = IngestError;

    fn try_from(raw: RawBooking) -> Result<Self, Self::Error> {
        raw.validate()?;

        let id = parse_id("id", &raw.id)?;
        let place_id = parse_id("placeId", &raw.place_id)?;
        let user_id = parse_optional_id("userId", raw.user_id.as_deref())?;
        let team_id = parse_optional_id("teamId", raw.team_id.as_deref())?;
        let start_time = parse_civil_datetime(&raw.start_time)?;
        let end_time = parse_civil_datetime(&raw.end_time)?;
        if start_time >= end_time {
            return Err(IngestError::Interval {
                id,
                start: start_time,
                end: end_time,
            });
        }
        let status = raw.status.parse()?;
        let created_at = match raw.created_at.as_deref() {
            Some(value) => Some(parse_civil_datetime(value)?),
            None => None,
        };

        Ok(Booking {
            id,
            place_id,
            user_id,
            team_id,
            start_time,
            end_time,
            status,
            place_name: raw.place_name,
            team_name: raw.team_name,
            user_name: raw.user_name,
            created_at,
        })
    }
}

impl TryFrom<RawPlace> for Place {
    type Error = IngestError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        raw.validate()?;

        let id = parse_id("id", &raw.id)?;
        // Older records miss the type entirely; they are all full-size pitches.
        let place_type = match raw.place_type.as_deref() {
            Some(value) => value.parse()?,
            None => PlaceType::Eleven,
        };

        Ok(Place {
            id,
            name: raw.name,
            location: raw.location,
            place_type,
            image_url: raw.image_url,
            description: raw.description,
        })
    }
}

/// Parses a civil timestamp in `YYYY-MM-DDTHH:MM:SS` form, also accepting
/// the seconds-less `YYYY-MM-DDTHH:MM` the backend emits for whole minutes.
pub fn parse_civil_datetime(value: &str) -> Result<NaiveDateTime, IngestError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| IngestError::Timestamp(value.to_string()))
}

fn parse_id(field: &'static str, value: &str) -> Result<Uuid, IngestError> {
    Uuid::parse_str(value).map_err(|source| IngestError::Id {
        field,
        value: value.to_string(),
        source,
    })
}

fn parse_optional_id(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Uuid>, IngestError> {
    value.map(|value| parse_id(field, value)).transpose()
}
