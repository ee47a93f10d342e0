use crate::backend::BookingBackend;
use crate::error::{ApiError, BackendError};
use crate::types::{Booking, BookingRequest, Page, Place, RawBooking, RawPlace};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP implementation of [`BookingBackend`] against the platform API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T>(response: Response, endpoint: &str) -> Result<T, BackendError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Failure bodies normally carry the API's { code, msg } shape. Keep
        // the bare status when they do not.
        match response.json::<ApiError>().await {
            Ok(api_error) => Err(BackendError::Api(api_error)),
            Err(_) => Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl BookingBackend for ApiClient {
    async fn places(&self) -> Result<Vec<Place>, BackendError> {
        let endpoint = format!("{}/api/place/all", self.base_url);
        debug!(%endpoint, "fetching places");

        let response = self.client.get(&endpoint).send().await?;
        let page: Page<RawPlace> = Self::decode(response, &endpoint).await?;
        let places = page
            .content
            .into_iter()
            .map(Place::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(places)
    }

    async fn place_bookings(&self, place_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        let endpoint = format!("{}/api/booking-matches/place/{place_id}", self.base_url);
        debug!(%endpoint, "fetching bookings");

        let response = self.client.get(&endpoint).send().await?;
        let raw: Vec<RawBooking> = Self::decode(response, &endpoint).await?;
        let bookings = raw
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, BackendError> {
        let endpoint = format!("{}/api/booking-matches", self.base_url);
        debug!(%endpoint, place_id = %request.place_id, "creating booking");

        let response = self.client.post(&endpoint).json(request).send().await?;
        let raw: RawBooking = Self::decode(response, &endpoint).await?;
        Ok(Booking::try_from(raw)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{BookingStatus, PlaceType};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::task::JoinHandle;

    const PLACE_ID: &str = "f2d9c7fe-63ab-4c55-8f0a-9a4b1a9a0be1";
    const BOOKING_ID: &str = "7a5e2b66-0c0f-4a3b-9a52-0d8f6f3f71aa";
    const USER_ID: &str = "9a2a79a7-98ab-4e46-b5be-84b3bb4f8d64";
    const TEAM_ID: &str = "4e6d8f0a-2f3b-4d0c-a7f1-35c0991b3e6a";

    async fn serve(app: Router) -> (String, JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{address}"), server)
    }

    fn raw_booking_json() -> Value {
        json!({
            "id": BOOKING_ID,
            "placeId": PLACE_ID,
            "userId": USER_ID,
            "teamId": TEAM_ID,
            "startTime": "2025-08-02T10:00:00",
            "endTime": "2025-08-02T12:00:00",
            "status": "CONFIRMED",
            "placeName": "City Arena"
        })
    }

    #[tokio::test]
    async fn places_unwraps_the_page_envelope() {
        let app = Router::new().route(
            "/api/place/all",
            get(|| async {
                Json(json!({
                    "content": [
                        {
                            "id": PLACE_ID,
                            "name": "City Arena",
                            "location": "Downtown",
                            "placeType": "FIVE"
                        },
                        {
                            "id": TEAM_ID,
                            "name": "Old Ground",
                            "location": "North End"
                        }
                    ]
                }))
            }),
        );
        let (base_url, server) = serve(app).await;

        let client = ApiClient::new(&base_url).unwrap();
        let places = client.places().await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "City Arena");
        assert_eq!(places[0].place_type, PlaceType::Five);
        // Records without a type are full-size pitches.
        assert_eq!(places[1].place_type, PlaceType::Eleven);

        server.abort();
    }

    #[tokio::test]
    async fn place_bookings_requests_the_given_place() {
        let app = Router::new().route(
            "/api/booking-matches/place/:place_id",
            get(|Path(place_id): Path<Uuid>| async move {
                assert_eq!(place_id.to_string(), PLACE_ID);
                Json(json!([raw_booking_json()]))
            }),
        );
        let (base_url, server) = serve(app).await;

        let client = ApiClient::new(&base_url).unwrap();
        let bookings = client
            .place_bookings(PLACE_ID.parse().unwrap())
            .await
            .unwrap();

        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id.to_string(), BOOKING_ID);
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);

        server.abort();
    }

    #[tokio::test]
    async fn create_booking_posts_the_wire_shape() {
        let seen = Arc::new(Mutex::new(None));
        let seen_by_handler = seen.clone();
        let app = Router::new().route(
            "/api/booking-matches",
            post(move |Json(body): Json<Value>| {
                let seen = seen_by_handler.clone();
                async move {
                    *seen.lock().unwrap() = Some(body);
                    (StatusCode::CREATED, Json(raw_booking_json()))
                }
            }),
        );
        let (base_url, server) = serve(app).await;

        let request = BookingRequest {
            place_id: PLACE_ID.parse().unwrap(),
            user_id: USER_ID.parse().unwrap(),
            team_id: TEAM_ID.parse().unwrap(),
            start_time: "2025-08-02T10:00:00".parse().unwrap(),
            end_time: "2025-08-02T12:00:00".parse().unwrap(),
            status: BookingStatus::PendingPayment,
            place_name: None,
            team_name: None,
            user_name: None,
        };

        let client = ApiClient::new(&base_url).unwrap();
        let created = client.create_booking(&request).await.unwrap();
        assert_eq!(created.id.to_string(), BOOKING_ID);

        let body = seen.lock().unwrap().take().unwrap();
        assert_eq!(body["placeId"], PLACE_ID);
        assert_eq!(body["startTime"], "2025-08-02T10:00:00");
        assert_eq!(body["status"], "PENDING_PAYMENT");

        server.abort();
    }

    #[tokio::test]
    async fn api_error_bodies_become_typed_errors() {
        let app = Router::new().route(
            "/api/booking-matches",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": 605,
                        "msg": "The selected time slot is already booked for this place"
                    })),
                )
            }),
        );
        let (base_url, server) = serve(app).await;

        let request = BookingRequest {
            place_id: PLACE_ID.parse().unwrap(),
            user_id: USER_ID.parse().unwrap(),
            team_id: TEAM_ID.parse().unwrap(),
            start_time: "2025-08-02T10:00:00".parse().unwrap(),
            end_time: "2025-08-02T11:00:00".parse().unwrap(),
            status: BookingStatus::PendingPayment,
            place_name: None,
            team_name: None,
            user_name: None,
        };

        let client = ApiClient::new(&base_url).unwrap();
        match client.create_booking(&request).await.unwrap_err() {
            BackendError::Api(api_error) => {
                assert_eq!(api_error.code, 605);
                assert_eq!(
                    api_error.user_message(),
                    "This time slot is already booked. Please select a different time"
                );
            }
            other => panic!("unexpected error: {other}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn unshaped_failures_keep_the_status_code() {
        let app = Router::new().route(
            "/api/place/all",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let (base_url, server) = serve(app).await;

        let client = ApiClient::new(&base_url).unwrap();
        match client.places().await.unwrap_err() {
            BackendError::UnexpectedStatus { status, endpoint } => {
                assert_eq!(status, 502);
                assert!(endpoint.ends_with("/api/place/all"));
            }
            other => panic!("unexpected error: {other}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn malformed_records_fail_ingestion() {
        let app = Router::new().route(
            "/api/booking-matches/place/:place_id",
            get(|| async {
                let mut body = raw_booking_json();
                body["startTime"] = json!("not-a-timestamp");
                Json(json!([body]))
            }),
        );
        let (base_url, server) = serve(app).await;

        let client = ApiClient::new(&base_url).unwrap();
        match client
            .place_bookings(PLACE_ID.parse().unwrap())
            .await
            .unwrap_err()
        {
            BackendError::Payload(_) => {}
            other => panic!("unexpected error: {other}"),
        }

        server.abort();
    }
}
