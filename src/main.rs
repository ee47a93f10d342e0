use crate::{
    backend::BookingBackend, cache::CachedBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, error::BackendError, http::ApiClient,
    local_bookings::LocalBookings,
    session::{BookingDetails, BookingSession, RecomputeTrigger},
    types::TimeSlot,
};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use futures::StreamExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod cache;
mod configuration;
mod configuration_handler;
mod error;
mod grouping;
mod http;
mod local_bookings;
mod session;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("###################");
    println!("# Booking Planner #");
    println!("###################");

    let configuration = ConfigurationHandler::parse_arguments();
    let now = Local::now().naive_local();

    let result = match configuration.api_base_url() {
        Some(base_url) => {
            info!(%base_url, "using the remote booking API");
            match ApiClient::new(base_url) {
                Ok(client) => run(CachedBackend::new(client), &configuration, now).await,
                Err(err) => Err(err),
            }
        }
        None => {
            info!("no API configured, using the seeded in-memory backend");
            run_local(&configuration, now).await
        }
    };

    if let Err(err) = result {
        if let BackendError::Api(api_error) = &err {
            println!("\n{}", api_error.user_message());
        }
        error!(?err, "booking planning failed");
        std::process::exit(1);
    }
}

async fn run_local(
    configuration: &ConfigurationHandler,
    now: NaiveDateTime,
) -> Result<(), BackendError> {
    let backend = LocalBookings::default();
    if let Some(path) = configuration.data_file() {
        backend.init_from_file(&path)?;
    }
    if backend.places().await?.is_empty() {
        backend.insert_example_data(planning_date(configuration, now));
    }

    run(backend.clone(), configuration, now).await?;

    if let Some(path) = configuration.data_file() {
        backend.save_to_file(&path)?;
    }
    Ok(())
}

async fn run<T: BookingBackend>(
    backend: T,
    configuration: &ConfigurationHandler,
    now: NaiveDateTime,
) -> Result<(), BackendError> {
    let places = backend.places().await?;
    let place = match &configuration.place {
        Some(name) => places.iter().find(|place| &place.name == name),
        None => places.first(),
    };
    let Some(place) = place else {
        error!(wanted = ?configuration.place, "no matching place");
        return Ok(());
    };

    println!(
        "\n{} ({}) at {}",
        place.name,
        place.place_type.display_name(),
        place.location
    );

    let date = planning_date(configuration, now);
    let operating_hours = configuration.operating_hours();
    let mut session = BookingSession::new(backend, operating_hours);
    let mut updates = session.slot_stream();
    session
        .handle_trigger(RecomputeTrigger::PlaceSelected(place.id), now)
        .await?;
    session
        .handle_trigger(RecomputeTrigger::DateSelected(date), now)
        .await?;

    println!(
        "Slots on {date} ({}:00 to {}:00):",
        operating_hours.start_hour(),
        operating_hours.end_hour()
    );
    print_grid(&updates.next().await.unwrap_or_default());

    for hour in &configuration.select {
        session.toggle_slot(&TimeSlot::slot_id(place.id, *hour));
    }
    if session.groups().is_empty() {
        return Ok(());
    }

    println!("\nPlanned bookings:");
    for group in session.groups() {
        println!(
            "  {} - {} ({})",
            group.start_time.format("%H:%M"),
            group.end_time.format("%H:%M"),
            group.format_duration()
        );
    }

    let (team_id, user_id) = match (configuration.team_id, configuration.user_id) {
        (Some(team_id), Some(user_id)) => (team_id, user_id),
        _ => {
            info!("pass --team-id and --user-id to submit the plan");
            return Ok(());
        }
    };
    let details = BookingDetails {
        team_id,
        user_id,
        team_name: None,
        user_name: None,
    };
    let created = session.submit(&details).await?;
    println!("\nSubmitted:");
    for booking in &created {
        println!(
            "  {} - {} ({})",
            booking.start_time.format("%Y-%m-%d %H:%M"),
            booking.end_time.format("%H:%M"),
            booking.id
        );
    }

    // The platform broadcasts a change for the booked day; deliver our own.
    session
        .handle_trigger(
            RecomputeTrigger::BookingsChanged {
                place_id: place.id,
                date,
            },
            now,
        )
        .await?;
    println!("\nSlots on {date} after booking:");
    print_grid(session.slots());
    Ok(())
}

fn print_grid(slots: &[TimeSlot]) {
    for slot in slots {
        println!(
            "  [{:>2}] {} - {}  {}",
            slot.hour(),
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M"),
            if slot.is_available { "free" } else { "taken" }
        );
    }
}

fn planning_date(configuration: &ConfigurationHandler, now: NaiveDateTime) -> NaiveDate {
    configuration
        .date
        .unwrap_or_else(|| now.date() + Days::new(1))
}
