use crate::error::{AgriWaterError, Result};
use crate::models::{DailyWeatherRecord, MissingDataPolicy, WeatherField, WeatherSeries};

/// Applies a [`MissingDataPolicy`] to a raw series.
///
/// The input is never modified; a new series is returned. Every policy except
/// `Drop` preserves the series length.
#[derive(Debug, Clone, Copy)]
pub struct WeatherSeriesNormalizer {
    policy: MissingDataPolicy,
}

impl WeatherSeriesNormalizer {
    pub fn new(policy: MissingDataPolicy) -> Self {
        Self { policy }
    }

    /// Parses the policy name before any data is touched.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn policy(&self) -> MissingDataPolicy {
        self.policy
    }

    pub fn normalize(&self, series: &WeatherSeries) -> Result<WeatherSeries> {
        if !series.has_missing() {
            return Ok(series.clone());
        }

        match self.policy {
            MissingDataPolicy::Raise => Err(missing_data_error(series)),
            MissingDataPolicy::ZeroFill => Ok(zero_fill(series)),
            MissingDataPolicy::Interpolate => Ok(interpolate(series)),
            MissingDataPolicy::Drop => Ok(drop_incomplete(series)),
        }
    }
}

fn missing_data_error(series: &WeatherSeries) -> AgriWaterError {
    let first = series
        .iter()
        .find_map(|r| r.missing_fields().first().map(|f| (r.date, *f)));
    let detail = match first {
        Some((date, field)) => format!(", first: {} on {}", field, date),
        None => String::new(),
    };
    AgriWaterError::weather(format!(
        "Missing meteorological data returned by the weather source ({} values{})",
        series.missing_count(),
        detail
    ))
}

fn zero_fill(series: &WeatherSeries) -> WeatherSeries {
    let records = series
        .iter()
        .map(|r| {
            let mut filled = r.clone();
            for field in WeatherField::ALL {
                if filled.get(field).is_none() {
                    filled.set(field, Some(0.0));
                }
            }
            filled
        })
        .collect();
    WeatherSeries::from_ordered(records)
}

/// Linear interpolation on the date axis, field by field. Gaps that are not
/// bounded by a known value on both sides stay unset.
fn interpolate(series: &WeatherSeries) -> WeatherSeries {
    let mut records: Vec<DailyWeatherRecord> = series.records().to_vec();
    let Some(origin) = records.first().map(|r| r.date) else {
        return series.clone();
    };
    let offsets: Vec<f64> = records
        .iter()
        .map(|r| (r.date - origin).num_days() as f64)
        .collect();

    let mut unbounded = 0usize;
    for field in WeatherField::ALL {
        let known: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.get(field).is_some())
            .map(|(i, _)| i)
            .collect();

        for i in 0..records.len() {
            if records[i].get(field).is_some() {
                continue;
            }
            let before = known.iter().rev().find(|&&k| k < i).copied();
            let after = known.iter().find(|&&k| k > i).copied();
            match (before, after) {
                (Some(b), Some(a)) => {
                    let (x0, x1) = (offsets[b], offsets[a]);
                    let (y0, y1) = (
                        records[b].get(field).unwrap_or_default(),
                        records[a].get(field).unwrap_or_default(),
                    );
                    let frac = (offsets[i] - x0) / (x1 - x0);
                    records[i].set(field, Some(y0 + (y1 - y0) * frac));
                }
                _ => unbounded += 1,
            }
        }
    }

    if unbounded > 0 {
        tracing::warn!(
            "{} missing values lie at the edge of the series and cannot be interpolated",
            unbounded
        );
    }

    WeatherSeries::from_ordered(records)
}

fn drop_incomplete(series: &WeatherSeries) -> WeatherSeries {
    let records: Vec<DailyWeatherRecord> = series
        .iter()
        .filter(|r| r.is_complete())
        .cloned()
        .collect();

    let dropped = series.len() - records.len();
    if dropped > 0 {
        tracing::warn!(
            "Dropped {} of {} days with missing values",
            dropped,
            series.len()
        );
    }

    WeatherSeries::from_ordered(records)
}
