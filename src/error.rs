use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Rejections produced by the ingestion boundary when a raw API payload
/// cannot be turned into a typed value. These are contract violations of the
/// upstream data source, kept separate from [`BackendError`] so that bad data
/// can never be mistaken for a business failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("payload failed shape validation: {0}")]
    Shape(#[from] validator::ValidationErrors),

    #[error("field `{field}` holds invalid id `{value}`")]
    Id {
        field: &'static str,
        value: String,
        source: uuid::Error,
    },

    #[error("invalid civil timestamp `{0}`, expected YYYY-MM-DDTHH:MM[:SS]")]
    Timestamp(String),

    #[error("unknown booking status `{0}`")]
    Status(String),

    #[error("unknown place type `{0}`")]
    PlaceType(String),

    #[error("booking {id} starts at {start} which is not before its end {end}")]
    Interval {
        id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Failures surfaced by a [`crate::backend::BookingBackend`] implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Api(ApiError),

    #[error("unexpected status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("rejected payload: {0}")]
    Payload(#[from] IngestError),

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Error body the booking API attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub msg: String,
}

impl ApiError {
    /// Message suited for direct display, looked up from the known code
    /// table. Unknown codes fall back to a generic line so a new backend
    /// code never renders as raw internals.
    pub fn user_message(&self) -> &'static str {
        match ApiErrorCode::from_code(self.code) {
            Some(code) => code.user_message(),
            None => "An unexpected error occurred. Please try again.",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "api error {}: {}", self.code, self.msg)
    }
}

impl From<ApiErrorCode> for ApiError {
    fn from(code: ApiErrorCode) -> Self {
        Self {
            code: code.code(),
            msg: code.message().to_string(),
        }
    }
}

/// Numeric error codes of the booking API that this client reacts to:
/// team lookups, place lookups, the booking family and the generic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    TeamNotFound,
    ForbiddenRole,
    InvalidPlaceId,
    InvalidPlaceName,
    InvalidPlaceDescription,
    InvalidPlaceImageUrl,
    InvalidPlaceLocation,
    InvalidPlaceType,
    PlaceNotFound,
    InvalidBookingId,
    InvalidBookingStartTime,
    InvalidBookingEndTime,
    InvalidMatchStatus,
    BookingNotFound,
    TimeSlotUnavailable,
    UnauthorizedBookingAction,
    MatchCannotBeCancelledNow,
    NoContent,
    NotFound,
    NoData,
    Unauthorized,
    Forbidden,
    InternalError,
    InvalidCredentials,
    InvalidToken,
}

impl ApiErrorCode {
    pub fn code(self) -> u16 {
        match self {
            Self::TeamNotFound => 303,
            Self::ForbiddenRole => 305,
            Self::InvalidPlaceId => 500,
            Self::InvalidPlaceName => 501,
            Self::InvalidPlaceDescription => 502,
            Self::InvalidPlaceImageUrl => 503,
            Self::InvalidPlaceLocation => 504,
            Self::InvalidPlaceType => 505,
            Self::PlaceNotFound => 506,
            Self::InvalidBookingId => 600,
            Self::InvalidBookingStartTime => 601,
            Self::InvalidBookingEndTime => 602,
            Self::InvalidMatchStatus => 603,
            Self::BookingNotFound => 604,
            Self::TimeSlotUnavailable => 605,
            Self::UnauthorizedBookingAction => 606,
            Self::MatchCannotBeCancelledNow => 607,
            Self::NoContent => 900,
            Self::NotFound => 901,
            Self::NoData => 902,
            Self::Unauthorized => 903,
            Self::Forbidden => 904,
            Self::InternalError => 905,
            Self::InvalidCredentials => 906,
            Self::InvalidToken => 907,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            303 => Self::TeamNotFound,
            305 => Self::ForbiddenRole,
            500 => Self::InvalidPlaceId,
            501 => Self::InvalidPlaceName,
            502 => Self::InvalidPlaceDescription,
            503 => Self::InvalidPlaceImageUrl,
            504 => Self::InvalidPlaceLocation,
            505 => Self::InvalidPlaceType,
            506 => Self::PlaceNotFound,
            600 => Self::InvalidBookingId,
            601 => Self::InvalidBookingStartTime,
            602 => Self::InvalidBookingEndTime,
            603 => Self::InvalidMatchStatus,
            604 => Self::BookingNotFound,
            605 => Self::TimeSlotUnavailable,
            606 => Self::UnauthorizedBookingAction,
            607 => Self::MatchCannotBeCancelledNow,
            900 => Self::NoContent,
            901 => Self::NotFound,
            902 => Self::NoData,
            903 => Self::Unauthorized,
            904 => Self::Forbidden,
            905 => Self::InternalError,
            906 => Self::InvalidCredentials,
            907 => Self::InvalidToken,
            _ => return None,
        })
    }

    /// Message the backend itself emits for this code.
    pub fn message(self) -> &'static str {
        match self {
            Self::TeamNotFound => "Team not found",
            Self::ForbiddenRole => "Must be an organizer",
            Self::InvalidPlaceId => "Place ID is either empty or null",
            Self::InvalidPlaceName => "Place name is either empty or null",
            Self::InvalidPlaceDescription => "Place description is either empty or null",
            Self::InvalidPlaceImageUrl => "Place image URL is either empty or null",
            Self::InvalidPlaceLocation => "Place location is either empty or null",
            Self::InvalidPlaceType => "Place type is invalid",
            Self::PlaceNotFound => "Place not found",
            Self::InvalidBookingId => "Booking match ID is either empty or null",
            Self::InvalidBookingStartTime => "Booking start time is invalid",
            Self::InvalidBookingEndTime => "Booking end time is invalid",
            Self::InvalidMatchStatus => "Booking match status is invalid",
            Self::BookingNotFound => "Booking match not found",
            Self::TimeSlotUnavailable => "The selected time slot is already booked for this place",
            Self::UnauthorizedBookingAction => "Only team organizers can perform this action",
            Self::MatchCannotBeCancelledNow => "Match Can not be cancelled now",
            Self::NoContent => "No content available",
            Self::NotFound => "Resource not found",
            Self::NoData => "No data provided",
            Self::Unauthorized => "Unauthorized access",
            Self::Forbidden => "Action is forbidden",
            Self::InternalError => "Internal server error",
            Self::InvalidCredentials => "Invalid credentials provided",
            Self::InvalidToken => "Token is invalid or expired",
        }
    }

    /// Reworded message for end users.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::TeamNotFound => "Team not found",
            Self::ForbiddenRole => "Only team organizers can perform this action",
            Self::InvalidPlaceId => "Invalid place ID provided",
            Self::InvalidPlaceName => "Please enter a valid place name",
            Self::InvalidPlaceDescription => "Please provide a place description",
            Self::InvalidPlaceImageUrl => "Please provide a valid image URL for the place",
            Self::InvalidPlaceLocation => "Please provide the place location",
            Self::InvalidPlaceType => "Invalid place type selected",
            Self::PlaceNotFound => "Place not found",
            Self::InvalidBookingId => "Invalid booking ID provided",
            Self::InvalidBookingStartTime => "Please select a valid start time",
            Self::InvalidBookingEndTime => "Please select a valid end time",
            Self::InvalidMatchStatus => "Invalid match status",
            Self::BookingNotFound => "Booking not found",
            Self::TimeSlotUnavailable => {
                "This time slot is already booked. Please select a different time"
            }
            Self::UnauthorizedBookingAction => "Only team organizers can perform this action",
            Self::MatchCannotBeCancelledNow => "This match cannot be cancelled at this time",
            Self::NoContent => "No content available",
            Self::NotFound => "Resource not found",
            Self::NoData => "No data provided",
            Self::Unauthorized => "Please log in to access this feature",
            Self::Forbidden => "You don't have permission to perform this action",
            Self::InternalError => "An internal error occurred. Please try again later",
            Self::InvalidCredentials => {
                "Invalid credentials. Please check your username and password"
            }
            Self::InvalidToken => "Your session has expired. Please log in again",
        }
    }
}
