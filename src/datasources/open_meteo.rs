use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{AgriWaterError, Result};
use crate::models::{DailyWeatherRecord, GeoCoordinate, WeatherSeries};
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;

pub const ARCHIVE_API_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

const DAILY_VARIABLES: &str = "temperature_2m_min,temperature_2m_mean,temperature_2m_max,\
precipitation_sum,et0_fao_evapotranspiration";

/// Historical daily weather from the Open-Meteo archive API.
/// ET0 is the FAO Penman-Monteith reference evapotranspiration.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

// Open-Meteo archive response structures
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    time: Vec<String>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_mean: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
    et0_fao_evapotranspiration: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgriWaterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn request_url(&self, location: &GeoCoordinate, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?latitude={}&longitude={}&daily={}&start_date={}&end_date={}&timezone=auto",
            self.base_url,
            location.latitude(),
            location.longitude(),
            DAILY_VARIABLES,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn fetch_daily(&self, location: &GeoCoordinate, day_count: u32) -> Result<WeatherSeries> {
        let (start, end) = date_range(Local::now().date_naive(), day_count)?;
        let url = self.request_url(location, start, end);
        tracing::debug!("Fetching Open-Meteo archive {} to {}", start, end);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AgriWaterError::weather_caused_by(
                    "The weather service timed out. Please check your internet connection.",
                    e,
                )
            } else {
                AgriWaterError::weather_caused_by(
                    format!("Failed to retrieve weather data for {}", location),
                    e,
                )
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.ok();
            return Err(status_error(status, body));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AgriWaterError::weather_caused_by("The weather service timed out.", e)
            } else {
                AgriWaterError::weather_caused_by("Failed to read weather service response", e)
            }
        })?;

        parse_response(&body)
    }
}

/// `day_count` days back from `today`, both ends included.
pub fn date_range(today: NaiveDate, day_count: u32) -> Result<(NaiveDate, NaiveDate)> {
    if day_count == 0 {
        return Err(AgriWaterError::Validation(
            "day_count must be a positive integer".into(),
        ));
    }
    let start = today
        .checked_sub_signed(Duration::days(day_count as i64))
        .ok_or_else(|| {
            AgriWaterError::Validation(format!(
                "day_count {} reaches before the earliest representable date",
                day_count
            ))
        })?;
    Ok((start, today))
}

fn status_error(status: reqwest::StatusCode, body: Option<String>) -> AgriWaterError {
    let body = body.unwrap_or_else(|| "<response body could not be read>".into());
    AgriWaterError::weather(format!(
        "Weather service returned an error ({}): {}",
        status, body
    ))
}

/// Convert an archive JSON body into a series. `null` values become unset
/// fields; schema violations are weather errors.
pub fn parse_response(body: &str) -> Result<WeatherSeries> {
    let response: ArchiveResponse = serde_json::from_str(body).map_err(|e| {
        AgriWaterError::weather_caused_by(format!("Unexpected API response format: {}", e), e)
    })?;
    let daily = response.daily;

    let n = daily.time.len();
    let columns = [
        ("temperature_2m_min", daily.temperature_2m_min.len()),
        ("temperature_2m_mean", daily.temperature_2m_mean.len()),
        ("temperature_2m_max", daily.temperature_2m_max.len()),
        ("et0_fao_evapotranspiration", daily.et0_fao_evapotranspiration.len()),
        ("precipitation_sum", daily.precipitation_sum.len()),
    ];
    if let Some((name, len)) = columns.iter().find(|(_, len)| *len != n) {
        return Err(AgriWaterError::weather(format!(
            "Unexpected API response format: '{}' has {} values for {} days",
            name, len, n
        )));
    }

    let mut records = Vec::with_capacity(n);
    for (i, time) in daily.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|e| {
            AgriWaterError::weather_caused_by(
                format!("Unexpected API response format: invalid date '{}'", time),
                e,
            )
        })?;
        let mut record = DailyWeatherRecord::new(date);
        record.temp_min = daily.temperature_2m_min[i];
        record.temp_mean = daily.temperature_2m_mean[i];
        record.temp_max = daily.temperature_2m_max[i];
        record.et0 = daily.et0_fao_evapotranspiration[i];
        record.precipitation = daily.precipitation_sum[i];
        records.push(record);
    }

    WeatherSeries::new(records).map_err(|e| {
        AgriWaterError::weather_caused_by("Unexpected API response format: unordered dates", e)
    })
}
