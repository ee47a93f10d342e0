use crate::availability::{compute_slots, OperatingHours};
use crate::backend::BookingBackend;
use crate::error::BackendError;
use crate::grouping::group_consecutive;
use crate::types::{Booking, BookingGroup, BookingRequest, BookingStatus, TimeSlot};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use futures::future::try_join_all;
use std::collections::HashSet;
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Events that force the slot grid to be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeTrigger {
    PlaceSelected(Uuid),
    DateSelected(NaiveDate),
    /// Real-time push telling us bookings changed somewhere. Only acted on
    /// when it concerns the place and date currently in view.
    BookingsChanged { place_id: Uuid, date: NaiveDate },
}

/// Who the booking is for. Supplied at submission time.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub user_name: Option<String>,
}

/// State of one booking form: the viewed place and date, the computed slot
/// grid, and the user's current selection grouped into consecutive runs.
///
/// All recomputation goes through [`BookingSession::handle_trigger`]; the
/// grid is republished on a watch channel after every refresh so observers
/// always see the latest state. Wall-clock time is injected by the caller.
pub struct BookingSession<T: BookingBackend> {
    backend: T,
    operating_hours: OperatingHours,
    place_id: Option<Uuid>,
    date: Option<NaiveDate>,
    slots: Vec<TimeSlot>,
    selected: HashSet<String>,
    groups: Vec<BookingGroup>,
    sender: Sender<Vec<TimeSlot>>,
}

impl<T: BookingBackend> BookingSession<T> {
    pub fn new(backend: T, operating_hours: OperatingHours) -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            backend,
            operating_hours,
            place_id: None,
            date: None,
            slots: Vec::new(),
            selected: HashSet::new(),
            groups: Vec::new(),
            sender,
        }
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn groups(&self) -> &[BookingGroup] {
        &self.groups
    }

    /// Subscribes to grid updates. The current grid is replayed immediately.
    pub fn slot_stream(&self) -> WatchStream<Vec<TimeSlot>> {
        let stream = WatchStream::new(self.sender.subscribe());
        self.send_slots();
        stream
    }

    fn send_slots(&self) {
        if let Err(err) = self.sender.send(self.slots.clone()) {
            error!(?err, "failed to publish the slot grid");
        }
    }

    pub async fn handle_trigger(
        &mut self,
        trigger: RecomputeTrigger,
        now: NaiveDateTime,
    ) -> Result<(), BackendError> {
        match trigger {
            RecomputeTrigger::PlaceSelected(place_id) => {
                self.place_id = Some(place_id);
                self.selected.clear();
                self.refresh(now).await
            }
            RecomputeTrigger::DateSelected(date) => {
                self.date = Some(date);
                self.selected.clear();
                self.refresh(now).await
            }
            RecomputeTrigger::BookingsChanged { place_id, date } => {
                if self.place_id == Some(place_id) && self.date == Some(date) {
                    info!(%place_id, %date, "bookings changed in view, refreshing");
                    self.refresh(now).await
                } else {
                    debug!(%place_id, %date, "ignoring change for another view");
                    Ok(())
                }
            }
        }
    }

    /// Refetches bookings and rebuilds the grid. Selected slots that vanished
    /// or turned unavailable fall out of the selection.
    async fn refresh(&mut self, now: NaiveDateTime) -> Result<(), BackendError> {
        let (Some(place_id), Some(date)) = (self.place_id, self.date) else {
            return Ok(());
        };

        let bookings = self.backend.place_bookings(place_id).await?;
        let mut slots = compute_slots(place_id, date, &bookings, self.operating_hours, now);

        // Bookings need a little lead time: on the current day, slots
        // starting within the next hour are not offered either.
        if date == now.date() {
            let earliest = now + Duration::hours(1);
            slots.retain(|slot| slot.start_time >= earliest);
        }

        debug!(%place_id, %date, slots = slots.len(), "recomputed slot grid");
        self.slots = slots;
        let slots = &self.slots;
        self.selected
            .retain(|id| slots.iter().any(|slot| slot.id == *id && slot.is_available));
        self.regroup();
        self.send_slots();
        Ok(())
    }

    /// Toggles a slot in or out of the selection. Unknown and unavailable
    /// slots are ignored.
    pub fn toggle_slot(&mut self, slot_id: &str) {
        match self.slots.iter().find(|slot| slot.id == slot_id) {
            None => {
                debug!(slot_id, "ignoring toggle of unknown slot");
                return;
            }
            Some(slot) if !slot.is_available => {
                debug!(slot_id, "ignoring toggle of unavailable slot");
                return;
            }
            Some(_) => {}
        }

        if !self.selected.remove(slot_id) {
            self.selected.insert(slot_id.to_string());
        }
        self.regroup();
    }

    fn regroup(&mut self) {
        let selected: Vec<TimeSlot> = self
            .slots
            .iter()
            .filter(|slot| self.selected.contains(&slot.id))
            .cloned()
            .collect();
        self.groups = group_consecutive(&selected);
    }

    /// One request per consecutive run, all pending payment.
    pub fn booking_requests(&self, details: &BookingDetails) -> Vec<BookingRequest> {
        let Some(place_id) = self.place_id else {
            return Vec::new();
        };

        self.groups
            .iter()
            .map(|group| BookingRequest {
                place_id,
                user_id: details.user_id,
                team_id: details.team_id,
                start_time: group.start_time,
                end_time: group.end_time,
                status: BookingStatus::PendingPayment,
                place_name: None,
                team_name: details.team_name.clone(),
                user_name: details.user_name.clone(),
            })
            .collect()
    }

    /// Submits every planned request concurrently. On success the form is
    /// reset; on failure the selection stays as it was so the user can retry.
    pub async fn submit(&mut self, details: &BookingDetails) -> Result<Vec<Booking>, BackendError> {
        let requests = self.booking_requests(details);
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let slot_count: usize = self.groups.iter().map(|group| group.slots.len()).sum();
        info!(
            groups = requests.len(),
            slots = slot_count,
            "submitting booking requests"
        );
        let created = try_join_all(
            requests
                .iter()
                .map(|request| self.backend.create_booking(request)),
        )
        .await?;

        self.selected.clear();
        self.groups.clear();
        self.slots.clear();
        self.send_slots();
        Ok(created)
    }
}
