use crate::error::{AgriWaterError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric columns of a daily weather record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherField {
    TempMin,
    TempMean,
    TempMax,
    Et0,
    Precipitation,
}

impl WeatherField {
    pub const ALL: [WeatherField; 5] = [
        WeatherField::TempMin,
        WeatherField::TempMean,
        WeatherField::TempMax,
        WeatherField::Et0,
        WeatherField::Precipitation,
    ];

    /// Fields the water balance cannot be computed without.
    pub const REQUIRED: [WeatherField; 2] = [WeatherField::Et0, WeatherField::Precipitation];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherField::TempMin => "temp_min",
            WeatherField::TempMean => "temp_mean",
            WeatherField::TempMax => "temp_max",
            WeatherField::Et0 => "et0",
            WeatherField::Precipitation => "precipitation",
        }
    }
}

impl std::fmt::Display for WeatherField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day of observations. Temperatures in °C, ET0 and precipitation in mm.
/// Any value may be unset until the series has been normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherRecord {
    pub date: NaiveDate,
    pub temp_min: Option<f64>,
    pub temp_mean: Option<f64>,
    pub temp_max: Option<f64>,
    pub et0: Option<f64>,
    pub precipitation: Option<f64>,
}

impl DailyWeatherRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temp_min: None,
            temp_mean: None,
            temp_max: None,
            et0: None,
            precipitation: None,
        }
    }

    pub fn get(&self, field: WeatherField) -> Option<f64> {
        match field {
            WeatherField::TempMin => self.temp_min,
            WeatherField::TempMean => self.temp_mean,
            WeatherField::TempMax => self.temp_max,
            WeatherField::Et0 => self.et0,
            WeatherField::Precipitation => self.precipitation,
        }
    }

    pub fn set(&mut self, field: WeatherField, value: Option<f64>) {
        let slot = match field {
            WeatherField::TempMin => &mut self.temp_min,
            WeatherField::TempMean => &mut self.temp_mean,
            WeatherField::TempMax => &mut self.temp_max,
            WeatherField::Et0 => &mut self.et0,
            WeatherField::Precipitation => &mut self.precipitation,
        };
        // NaN coming from upstream arithmetic counts as missing
        *slot = value.filter(|v| !v.is_nan());
    }

    pub fn missing_fields(&self) -> Vec<WeatherField> {
        WeatherField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        WeatherField::ALL.iter().all(|f| self.get(*f).is_some())
    }
}

/// Daily records in strictly ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherSeries {
    records: Vec<DailyWeatherRecord>,
}

impl WeatherSeries {
    pub fn new(records: Vec<DailyWeatherRecord>) -> Result<Self> {
        if let Some(pair) = records.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(AgriWaterError::Calculation(format!(
                "weather series dates must be strictly ascending ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { records })
    }

    /// For records taken, in order, from an existing series.
    pub(crate) fn from_ordered(records: Vec<DailyWeatherRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].date < w[1].date));
        Self { records }
    }

    pub fn records(&self) -> &[DailyWeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyWeatherRecord> {
        self.records.iter()
    }

    /// Number of unset values across all numeric fields.
    pub fn missing_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.missing_fields().len())
            .sum()
    }

    pub fn has_missing(&self) -> bool {
        self.records.iter().any(|r| !r.is_complete())
    }

    /// True when no record carries a value for `field`.
    pub fn field_absent(&self, field: WeatherField) -> bool {
        self.records.iter().all(|r| r.get(field).is_none())
    }

    /// The last `n` records (most recent days).
    pub fn tail(&self, n: usize) -> &[DailyWeatherRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn into_records(self) -> Vec<DailyWeatherRecord> {
        self.records
    }
}

/// How unset values in a raw series are handled before any calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDataPolicy {
    #[default]
    Raise,
    #[serde(rename = "zero")]
    ZeroFill,
    Interpolate,
    Drop,
}

impl MissingDataPolicy {
    pub const NAMES: [&'static str; 4] = ["raise", "zero", "interpolate", "drop"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissingDataPolicy::Raise => "raise",
            MissingDataPolicy::ZeroFill => "zero",
            MissingDataPolicy::Interpolate => "interpolate",
            MissingDataPolicy::Drop => "drop",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MissingDataPolicy::Raise => "Stop with an error if any value is missing",
            MissingDataPolicy::ZeroFill => "Replace missing values with 0",
            MissingDataPolicy::Interpolate => "Linear interpolation between known days",
            MissingDataPolicy::Drop => "Remove days with missing values",
        }
    }
}

impl std::str::FromStr for MissingDataPolicy {
    type Err = AgriWaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raise" => Ok(MissingDataPolicy::Raise),
            "zero" => Ok(MissingDataPolicy::ZeroFill),
            "interpolate" => Ok(MissingDataPolicy::Interpolate),
            "drop" => Ok(MissingDataPolicy::Drop),
            _ => Err(AgriWaterError::Validation(format!(
                "Unknown missing data policy: '{}'. Allowed values: {}",
                s,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for MissingDataPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let records = vec![DailyWeatherRecord::new(day(2)), DailyWeatherRecord::new(day(1))];
        assert!(matches!(
            WeatherSeries::new(records),
            Err(AgriWaterError::Calculation(_))
        ));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let records = vec![DailyWeatherRecord::new(day(3)), DailyWeatherRecord::new(day(3))];
        assert!(WeatherSeries::new(records).is_err());
    }

    #[test]
    fn tail_returns_most_recent_days() {
        let series = WeatherSeries::new((1..=5).map(|d| DailyWeatherRecord::new(day(d))).collect())
            .unwrap();
        let tail: Vec<_> = series.tail(2).iter().map(|r| r.date).collect();
        assert_eq!(tail, vec![day(4), day(5)]);
        assert_eq!(series.tail(10).len(), 5);
    }

    #[test]
    fn set_treats_nan_as_missing() {
        let mut record = DailyWeatherRecord::new(day(1));
        record.set(WeatherField::Et0, Some(f64::NAN));
        assert_eq!(record.et0, None);
        record.set(WeatherField::Et0, Some(3.2));
        assert_eq!(record.get(WeatherField::Et0), Some(3.2));
    }

    #[test]
    fn missing_count_spans_all_fields() {
        let mut record = DailyWeatherRecord::new(day(1));
        record.et0 = Some(1.0);
        let series = WeatherSeries::new(vec![record]).unwrap();
        assert_eq!(series.missing_count(), 4);
        assert!(series.has_missing());
        assert!(!series.field_absent(WeatherField::Et0));
        assert!(series.field_absent(WeatherField::Precipitation));
    }

    #[test]
    fn policy_names_are_case_sensitive() {
        assert_eq!(
            "interpolate".parse::<MissingDataPolicy>().unwrap(),
            MissingDataPolicy::Interpolate
        );
        assert_eq!(
            "zero".parse::<MissingDataPolicy>().unwrap(),
            MissingDataPolicy::ZeroFill
        );
        assert!(matches!(
            "Raise".parse::<MissingDataPolicy>(),
            Err(AgriWaterError::Validation(_))
        ));
        assert!("median".parse::<MissingDataPolicy>().is_err());
    }

    #[test]
    fn policy_round_trips_through_its_name() {
        for name in MissingDataPolicy::NAMES {
            let policy: MissingDataPolicy = name.parse().unwrap();
            assert_eq!(policy.as_str(), name);
        }
    }
}
