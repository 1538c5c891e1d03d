use crate::error::Result;
use crate::logic::validation;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EFFICIENCY: f64 = 0.85;

/// Calculation window and application efficiency, checked against the
/// length of the series they will be applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrigationParameters {
    pub period_days: u32,
    pub efficiency: f64,
}

impl IrrigationParameters {
    pub fn new(period_days: u32, efficiency: f64, series_length: usize) -> Result<Self> {
        validation::validate_period(period_days, series_length)?;
        validation::validate_efficiency(efficiency)?;
        Ok(Self {
            period_days,
            efficiency,
        })
    }
}

/// Water balance over a period, all depths in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterBalanceResult {
    pub avg_etc_mm_day: f64,
    pub total_etc_mm: f64,
    pub total_precipitation_mm: f64,
    pub net_irrigation_need_mm: f64,
    pub gross_irrigation_need_mm: f64,
}

/// Water balance scaled to a field surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrigationVolume {
    #[serde(flatten)]
    pub balance: WaterBalanceResult,
    pub surface_ha: f64,
    pub net_volume_m3: f64,
    pub gross_volume_m3: f64,
}

/// The decision handed to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgronomicSummary {
    pub period_days: u32,
    pub total_precip_mm: f64,
    pub total_etc_mm: f64,
    pub water_balance_mm: f64,
    pub irrigation_required: bool,
    pub recommended_mm: f64,
    pub recommended_m3_per_ha: f64,
    pub recommended_total_m3: f64,
    pub surface_ha: f64,
    pub efficiency: f64,
    pub crop_name: String,
    pub crop_stage: String,
}
