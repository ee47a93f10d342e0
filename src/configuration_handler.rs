use crate::availability::OperatingHours;
use crate::configuration::Configuration;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

/// Command line configuration of the booking planner.
#[derive(Debug, Clone, Parser)]
#[command(about = "Plan and submit football pitch bookings")]
pub struct ConfigurationHandler {
    /// First bookable hour of the day.
    #[arg(long, default_value_t = 8)]
    start_hour: u32,

    /// Hour the grid ends at (exclusive, 24 = midnight).
    #[arg(long, default_value_t = 24)]
    end_hour: u32,

    /// Base URL of the booking API. Falls back to the BOOKING_API_URL
    /// environment variable; without either, a seeded in-memory backend
    /// is used.
    #[arg(long)]
    api_base_url: Option<String>,

    /// Where the in-memory backend loads and saves its state.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Name of the place to plan for. Defaults to the first listed place.
    #[arg(long)]
    pub place: Option<String>,

    /// Day to plan for (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Hours to select, comma separated, e.g. 18,19,21.
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<u32>,

    /// Team to book for. Submission needs this and --user-id.
    #[arg(long)]
    pub team_id: Option<Uuid>,

    /// User submitting the bookings.
    #[arg(long)]
    pub user_id: Option<Uuid>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn operating_hours(&self) -> OperatingHours {
        OperatingHours::new(self.start_hour, self.end_hour)
    }

    fn api_base_url(&self) -> Option<String> {
        self.api_base_url
            .clone()
            .or_else(|| std::env::var("BOOKING_API_URL").ok())
    }

    fn data_file(&self) -> Option<PathBuf> {
        self.data_file.clone()
    }
}
