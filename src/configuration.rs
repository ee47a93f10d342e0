use crate::availability::OperatingHours;
use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn operating_hours(&self) -> OperatingHours;
    fn api_base_url(&self) -> Option<String>;
    fn data_file(&self) -> Option<PathBuf>;
}
