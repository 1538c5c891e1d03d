use super::calculations::mm_to_m3_per_ha;
use super::evapotranspiration::{DailyEtc, EvapotranspirationEngine};
use super::normalizer::WeatherSeriesNormalizer;
use super::validation;
use crate::datasources::{CropCatalog, WeatherSource};
use crate::error::{AgriWaterError, Result};
use crate::export::ExportRecord;
use crate::models::{
    readable_stage, AgronomicSummary, CropProfile, GeoCoordinate, IrrigationVolume,
    MissingDataPolicy, WeatherSeries,
};

/// Everything the operator chooses for one field.
#[derive(Debug, Clone)]
pub struct FieldRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub crop: String,
    pub stage: String,
    pub surface_ha: f64,
    pub missing_data_policy: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Parameters validated, no weather fetched yet.
    Ready,
    /// A normalized series is cached.
    DataLoaded { days: usize },
}

/// Computes irrigation needs for one homogeneous field.
///
/// Location, crop stage, surface and missing-data policy are fixed for the
/// lifetime of the instance. The normalized weather series is cached and
/// re-fetched only when a calculation asks for more days than it holds.
pub struct IrrigationOrchestrator<W: WeatherSource> {
    location: GeoCoordinate,
    crop: CropProfile,
    stage: String,
    kc: f64,
    surface_ha: f64,
    normalizer: WeatherSeriesNormalizer,
    weather: W,
    series: Option<WeatherSeries>,
}

impl<W: WeatherSource> IrrigationOrchestrator<W> {
    pub fn new(weather: W, crops: &impl CropCatalog, request: FieldRequest) -> Result<Self> {
        let location = GeoCoordinate::new(request.latitude, request.longitude)?;
        validation::validate_surface(request.surface_ha)?;
        let normalizer = WeatherSeriesNormalizer::from_name(&request.missing_data_policy)?;

        let params = crops.stage_parameters(&request.crop, &request.stage)?;
        let crop = crops.crop(&request.crop)?.clone();
        let stage = request.stage.to_lowercase();

        tracing::info!("Irrigation calculator initialized");
        tracing::info!("- Location: {}", location);
        tracing::info!("- Crop: {} ({})", crop.full_name, crop.name);
        tracing::info!("- Stage: {}", readable_stage(&stage));
        tracing::info!("- Kc: {:.2}", params.kc);
        tracing::info!("- Surface: {:.2} ha", request.surface_ha);
        tracing::info!("- Missing data policy: {}", normalizer.policy());

        Ok(Self {
            location,
            crop,
            stage,
            kc: params.kc,
            surface_ha: request.surface_ha,
            normalizer,
            weather,
            series: None,
        })
    }

    pub fn location(&self) -> &GeoCoordinate {
        &self.location
    }

    pub fn crop(&self) -> &CropProfile {
        &self.crop
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn kc(&self) -> f64 {
        self.kc
    }

    pub fn surface_ha(&self) -> f64 {
        self.surface_ha
    }

    pub fn policy(&self) -> MissingDataPolicy {
        self.normalizer.policy()
    }

    pub fn state(&self) -> OrchestratorState {
        match &self.series {
            Some(series) => OrchestratorState::DataLoaded { days: series.len() },
            None => OrchestratorState::Ready,
        }
    }

    /// The crop's longest recommended interval between waterings.
    pub fn default_period(&self) -> u32 {
        self.crop.irrigation_interval.max_days
    }

    /// Fetch and normalize `day_count` days, replacing any cached series.
    /// Nothing is cached unless both steps succeed.
    pub async fn fetch_weather_data(&mut self, day_count: u32) -> Result<&WeatherSeries> {
        tracing::info!("Fetching weather data for the last {} days", day_count);

        let normalized = match self.fetch_and_normalize(day_count).await {
            Ok(series) => series,
            Err(e @ AgriWaterError::WeatherApi { .. }) => {
                return Err(AgriWaterError::weather_caused_by(
                    format!(
                        "IrrigationOrchestrator failed to fetch weather data (policy={})",
                        self.policy()
                    ),
                    e,
                ));
            }
            Err(e) => return Err(e),
        };

        Ok(self.series.insert(normalized))
    }

    async fn fetch_and_normalize(&self, day_count: u32) -> Result<WeatherSeries> {
        let raw = self.weather.fetch_daily(&self.location, day_count).await?;
        self.normalizer.normalize(&raw)
    }

    async fn ensure_data(&mut self, period_days: u32) -> Result<()> {
        match &self.series {
            Some(series) if series.len() >= period_days as usize => {
                tracing::debug!(
                    "Reusing cached weather series ({} days) for a {} day period",
                    series.len(),
                    period_days
                );
            }
            _ => {
                self.fetch_weather_data(period_days).await?;
            }
        }
        Ok(())
    }

    fn engine(&self) -> Result<EvapotranspirationEngine> {
        let series = self.series.as_ref().ok_or_else(|| {
            AgriWaterError::Calculation("no weather data loaded".into())
        })?;
        EvapotranspirationEngine::new(series, self.kc, self.crop.full_name.clone())
    }

    /// Water balance and volumes for the last `period_days` days (the crop's
    /// maximum irrigation interval when `None`).
    pub async fn calculate_irrigation_needs(
        &mut self,
        period_days: Option<u32>,
        efficiency: f64,
    ) -> Result<IrrigationVolume> {
        let period_days = match period_days {
            Some(days) => days,
            None => {
                let days = self.default_period();
                tracing::info!("Using recommended irrigation period: {} days", days);
                days
            }
        };
        validation::validate_efficiency(efficiency)?;
        if period_days == 0 {
            return Err(AgriWaterError::Validation(
                "period_days must be a positive integer".into(),
            ));
        }

        self.ensure_data(period_days).await?;
        self.engine()?
            .irrigation_volume(self.surface_ha, period_days, efficiency)
    }

    /// Irrigate exactly enough to close a negative water balance.
    pub async fn generate_agronomic_summary(
        &mut self,
        period_days: Option<u32>,
        efficiency: f64,
    ) -> Result<AgronomicSummary> {
        let period_days = period_days.unwrap_or_else(|| self.default_period());
        let volume = self
            .calculate_irrigation_needs(Some(period_days), efficiency)
            .await?;

        let total_precip_mm = volume.balance.total_precipitation_mm;
        let total_etc_mm = volume.balance.total_etc_mm;
        let water_balance_mm = total_precip_mm - total_etc_mm;

        let irrigation_required = water_balance_mm < 0.0;
        let recommended_mm = if irrigation_required {
            water_balance_mm.abs()
        } else {
            0.0
        };
        let recommended_m3_per_ha = mm_to_m3_per_ha(recommended_mm);
        let recommended_total_m3 = recommended_m3_per_ha * self.surface_ha;

        Ok(AgronomicSummary {
            period_days,
            total_precip_mm,
            total_etc_mm,
            water_balance_mm,
            irrigation_required,
            recommended_mm,
            recommended_m3_per_ha,
            recommended_total_m3,
            surface_ha: self.surface_ha,
            efficiency,
            crop_name: self.crop.name.clone(),
            crop_stage: self.stage.clone(),
        })
    }

    /// The flat record written by the CSV export, stamped with the current
    /// local time.
    pub async fn export_record(
        &mut self,
        period_days: Option<u32>,
        efficiency: f64,
    ) -> Result<ExportRecord> {
        let volume = self
            .calculate_irrigation_needs(period_days, efficiency)
            .await?;
        Ok(ExportRecord::new(
            chrono::Local::now(),
            self.crop.full_name.clone(),
            self.stage.clone(),
            self.kc,
            &self.location,
            &volume,
        ))
    }

    /// The cached series with per-day ETc, fetching the default period first
    /// if nothing is loaded.
    pub async fn weather_with_etc(&mut self) -> Result<Vec<DailyEtc>> {
        if self.series.is_none() {
            self.fetch_weather_data(self.default_period()).await?;
        }
        Ok(self.engine()?.compute_etc().to_vec())
    }
}
