//! FAO-56 crop evapotranspiration and water balance.
//!
//! `ETc = ET0 × Kc`, summed over the most recent days of a normalized series
//! and compared with the precipitation over the same window.

use super::calculations::{mean, mm_to_m3};
use super::validation;
use crate::error::{AgriWaterError, Result};
use crate::models::{
    IrrigationParameters, IrrigationVolume, WaterBalanceResult, WeatherField, WeatherSeries,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::cell::OnceCell;

/// Crop evapotranspiration of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyEtc {
    pub date: NaiveDate,
    pub et0: f64,
    pub precipitation: f64,
    pub etc: f64,
}

#[derive(Debug, Clone, Copy)]
struct DayBalance {
    date: NaiveDate,
    et0: f64,
    precipitation: f64,
}

pub struct EvapotranspirationEngine {
    days: Vec<DayBalance>,
    kc: f64,
    crop_label: String,
    etc: OnceCell<Vec<DailyEtc>>,
}

impl EvapotranspirationEngine {
    /// Takes its own copy of the series, which must already be normalized.
    pub fn new(series: &WeatherSeries, kc: f64, crop_label: impl Into<String>) -> Result<Self> {
        if series.is_empty() {
            return Err(AgriWaterError::Calculation(
                "weather series contains no days".into(),
            ));
        }

        let absent: Vec<&str> = WeatherField::REQUIRED
            .iter()
            .filter(|f| series.field_absent(**f))
            .map(|f| f.as_str())
            .collect();
        if !absent.is_empty() {
            return Err(AgriWaterError::Calculation(format!(
                "Missing required fields in weather data: {:?}",
                absent
            )));
        }

        validation::validate_crop_coefficient(kc)?;

        if series.has_missing() {
            return Err(AgriWaterError::Validation(format!(
                "weather data contains {} missing values; handle missing data before calculating",
                series.missing_count()
            )));
        }

        let mut days = Vec::with_capacity(series.len());
        for record in series.iter() {
            let et0 = record.et0.unwrap_or_default();
            let precipitation = record.precipitation.unwrap_or_default();
            if et0 < 0.0 || precipitation < 0.0 {
                return Err(AgriWaterError::Calculation(format!(
                    "negative ET0 or precipitation on {} (et0={}, precipitation={})",
                    record.date, et0, precipitation
                )));
            }
            days.push(DayBalance {
                date: record.date,
                et0,
                precipitation,
            });
        }

        Ok(Self {
            days,
            kc,
            crop_label: crop_label.into(),
            etc: OnceCell::new(),
        })
    }

    pub fn kc(&self) -> f64 {
        self.kc
    }

    pub fn crop_label(&self) -> &str {
        &self.crop_label
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Per-day ETc, aligned one-to-one with the input series.
    pub fn compute_etc(&self) -> &[DailyEtc] {
        self.etc.get_or_init(|| {
            self.days
                .iter()
                .map(|d| DailyEtc {
                    date: d.date,
                    et0: d.et0,
                    precipitation: d.precipitation,
                    etc: d.et0 * self.kc,
                })
                .collect()
        })
    }

    /// Total precipitation (mm) over the last `period_days` days.
    pub fn cumulative_precipitation(&self, period_days: u32) -> Result<f64> {
        validation::validate_period(period_days, self.days.len())?;
        Ok(self
            .tail(period_days as usize)
            .iter()
            .map(|d| d.precipitation)
            .sum())
    }

    /// Mean daily ETc (mm/day) over the last `period_days` days, or the whole
    /// series when `None`.
    pub fn average_etc(&self, period_days: Option<u32>) -> Result<f64> {
        let etc = self.compute_etc();
        let window = match period_days {
            Some(days) => {
                validation::validate_period(days, etc.len())?;
                &etc[etc.len() - days as usize..]
            }
            None => etc,
        };
        mean(window.iter().map(|d| d.etc))
            .ok_or_else(|| AgriWaterError::Calculation("no ETc values to average".into()))
    }

    pub fn irrigation_need(&self, period_days: u32, efficiency: f64) -> Result<WaterBalanceResult> {
        let params = IrrigationParameters::new(period_days, efficiency, self.days.len())?;

        let avg_etc_mm_day = self.average_etc(Some(params.period_days))?;
        let total_etc_mm = avg_etc_mm_day * params.period_days as f64;
        let total_precipitation_mm = self.cumulative_precipitation(params.period_days)?;

        let net_irrigation_need_mm = (total_etc_mm - total_precipitation_mm).max(0.0);
        let gross_irrigation_need_mm = if net_irrigation_need_mm > 0.0 {
            net_irrigation_need_mm / params.efficiency
        } else {
            0.0
        };

        tracing::debug!(
            crop = %self.crop_label,
            period_days,
            avg_etc_mm_day,
            net_irrigation_need_mm,
            "water balance computed"
        );

        Ok(WaterBalanceResult {
            avg_etc_mm_day,
            total_etc_mm,
            total_precipitation_mm,
            net_irrigation_need_mm,
            gross_irrigation_need_mm,
        })
    }

    pub fn irrigation_volume(
        &self,
        surface_ha: f64,
        period_days: u32,
        efficiency: f64,
    ) -> Result<IrrigationVolume> {
        validation::validate_surface(surface_ha)?;
        let balance = self.irrigation_need(period_days, efficiency)?;

        Ok(IrrigationVolume {
            balance,
            surface_ha,
            net_volume_m3: mm_to_m3(balance.net_irrigation_need_mm, surface_ha),
            gross_volume_m3: mm_to_m3(balance.gross_irrigation_need_mm, surface_ha),
        })
    }

    fn tail(&self, n: usize) -> &[DayBalance] {
        &self.days[self.days.len() - n..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyWeatherRecord;
    use chrono::Duration;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn series(et0: &[f64], precipitation: &[f64]) -> WeatherSeries {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let records = et0
            .iter()
            .zip(precipitation)
            .enumerate()
            .map(|(i, (&e, &p))| DailyWeatherRecord {
                date: start + Duration::days(i as i64),
                temp_min: Some(14.0),
                temp_mean: Some(21.0),
                temp_max: Some(28.0),
                et0: Some(e),
                precipitation: Some(p),
            })
            .collect();
        WeatherSeries::new(records).unwrap()
    }

    fn reference_engine() -> EvapotranspirationEngine {
        EvapotranspirationEngine::new(&series(&[4.0; 7], &[1.0; 7]), 1.2, "Maize").unwrap()
    }

    #[test]
    fn etc_is_et0_times_kc_for_every_day() {
        let data = series(&[3.0, 4.5, 5.2, 0.0], &[0.0; 4]);
        for kc in [0.0, 0.3, 1.0, 1.15, 2.0] {
            let engine = EvapotranspirationEngine::new(&data, kc, "test").unwrap();
            let etc = engine.compute_etc();
            assert_eq!(etc.len(), data.len());
            for (day, record) in etc.iter().zip(data.iter()) {
                assert_eq!(day.date, record.date);
                assert_eq!(day.etc, record.et0.unwrap() * kc);
            }
        }
    }

    #[test]
    fn compute_etc_is_idempotent() {
        let engine = reference_engine();
        let first = engine.compute_etc().to_vec();
        assert_eq!(engine.compute_etc(), first.as_slice());
    }

    #[test]
    fn cumulative_precipitation_sums_the_most_recent_days() {
        let engine =
            EvapotranspirationEngine::new(&series(&[1.0; 5], &[5.0, 0.0, 2.0, 3.0, 4.0]), 1.0, "x")
                .unwrap();
        assert_close(engine.cumulative_precipitation(3).unwrap(), 9.0);
        assert_close(engine.cumulative_precipitation(5).unwrap(), 14.0);
        assert!(matches!(
            engine.cumulative_precipitation(6),
            Err(AgriWaterError::Validation(_))
        ));
        assert!(engine.cumulative_precipitation(0).is_err());
    }

    #[test]
    fn average_etc_over_window_and_whole_series() {
        let engine =
            EvapotranspirationEngine::new(&series(&[2.0, 2.0, 4.0, 6.0], &[0.0; 4]), 1.0, "x")
                .unwrap();
        assert_close(engine.average_etc(Some(2)).unwrap(), 5.0);
        assert_close(engine.average_etc(None).unwrap(), 3.5);
        assert!(engine.average_etc(Some(5)).is_err());
    }

    #[test]
    fn reference_scenario_water_balance() {
        let need = reference_engine().irrigation_need(7, 0.8).unwrap();
        assert_close(need.avg_etc_mm_day, 4.8);
        assert_close(need.total_etc_mm, 33.6);
        assert_close(need.total_precipitation_mm, 7.0);
        assert_close(need.net_irrigation_need_mm, 26.6);
        assert_close(need.gross_irrigation_need_mm, 33.25);
    }

    #[test]
    fn reference_scenario_volumes_for_two_hectares() {
        let volume = reference_engine().irrigation_volume(2.0, 7, 0.8).unwrap();
        assert_close(volume.net_volume_m3, 532.0);
        assert_close(volume.gross_volume_m3, 665.0);
        assert_eq!(volume.surface_ha, 2.0);
    }

    #[test]
    fn rain_surplus_means_no_need() {
        let engine = EvapotranspirationEngine::new(&series(&[2.0; 3], &[10.0; 3]), 1.0, "x").unwrap();
        let need = engine.irrigation_need(3, 0.85).unwrap();
        assert_eq!(need.net_irrigation_need_mm, 0.0);
        assert_eq!(need.gross_irrigation_need_mm, 0.0);
    }

    #[test]
    fn gross_is_net_over_efficiency() {
        let engine = EvapotranspirationEngine::new(&series(&[5.0; 4], &[1.0; 4]), 1.1, "x").unwrap();
        for efficiency in [0.5, 0.75, 0.9, 1.0] {
            let need = engine.irrigation_need(4, efficiency).unwrap();
            assert!(need.net_irrigation_need_mm > 0.0);
            assert_close(
                need.gross_irrigation_need_mm,
                need.net_irrigation_need_mm / efficiency,
            );
            assert!(need.gross_irrigation_need_mm >= need.net_irrigation_need_mm);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let engine = reference_engine();
        for efficiency in [0.0, -0.2, 1.2] {
            assert!(matches!(
                engine.irrigation_need(7, efficiency),
                Err(AgriWaterError::Validation(_))
            ));
        }
        for surface in [0.0, -3.0] {
            assert!(matches!(
                engine.irrigation_volume(surface, 7, 0.8),
                Err(AgriWaterError::Validation(_))
            ));
        }
        assert!(engine.irrigation_need(8, 0.8).is_err());
    }

    #[test]
    fn kc_out_of_range_is_a_validation_error() {
        let result = EvapotranspirationEngine::new(&series(&[4.0], &[0.0]), 2.5, "x");
        assert!(matches!(result, Err(AgriWaterError::Validation(_))));
    }

    #[test]
    fn missing_values_are_a_validation_error() {
        let mut records = series(&[4.0, 4.0], &[0.0, 0.0]).into_records();
        records[1].precipitation = None;
        let result = EvapotranspirationEngine::new(&WeatherSeries::new(records).unwrap(), 1.0, "x");
        assert!(matches!(result, Err(AgriWaterError::Validation(_))));
    }

    #[test]
    fn absent_required_field_is_a_calculation_error() {
        let mut records = series(&[4.0, 4.0], &[0.0, 0.0]).into_records();
        for record in &mut records {
            record.et0 = None;
        }
        let result = EvapotranspirationEngine::new(&WeatherSeries::new(records).unwrap(), 1.0, "x");
        match result {
            Err(AgriWaterError::Calculation(msg)) => assert!(msg.contains("et0")),
            _ => panic!("expected a calculation error"),
        }
        assert!(matches!(
            EvapotranspirationEngine::new(&WeatherSeries::default(), 1.0, "x"),
            Err(AgriWaterError::Calculation(_))
        ));
    }

    #[test]
    fn negative_et0_is_a_calculation_error() {
        let result = EvapotranspirationEngine::new(&series(&[-1.0], &[0.0]), 1.0, "x");
        assert!(matches!(result, Err(AgriWaterError::Calculation(_))));
    }
}
