pub mod crop_database;
pub mod open_meteo;

pub use crop_database::CropDatabase;
pub use open_meteo::OpenMeteoClient;

use crate::error::Result;
use crate::models::{CropProfile, GeoCoordinate, StageParameters, WeatherSeries};

/// Source of daily weather observations.
///
/// Implementations make a single attempt bounded by a timeout and return the
/// series only once the whole response has been received and parsed. Every
/// failure is reported as `AgriWaterError::WeatherApi`.
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    /// Daily records for the last `day_count` days at `location`.
    async fn fetch_daily(&self, location: &GeoCoordinate, day_count: u32) -> Result<WeatherSeries>;
}

/// Read-only crop parameters.
pub trait CropCatalog {
    /// Crop names, sorted.
    fn available_crops(&self) -> Vec<&str>;

    /// Fails with `CropData` if the crop is unknown.
    fn crop(&self, name: &str) -> Result<&CropProfile>;

    /// Fails with `CropData` if the crop or stage is unknown and with
    /// `Validation` if the stored Kc is out of range.
    fn stage_parameters(&self, crop: &str, stage: &str) -> Result<StageParameters>;
}
