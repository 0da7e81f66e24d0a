use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::fetch_error::FetchError;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DAILY_FIELDS: &str =
    "weathercode,temperature_2m_max,temperature_2m_min,relative_humidity_2m_mean";

/// Coarse sky condition derived from a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::PartlyCloudy,
            45..=48 => WeatherCondition::Fog,
            51..=57 => WeatherCondition::Drizzle,
            61..=67 => WeatherCondition::Rain,
            71..=77 => WeatherCondition::Snow,
            80..=82 => WeatherCondition::RainShowers,
            85..=86 => WeatherCondition::SnowShowers,
            95..=99 => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastDay {
    /// Position in the response, 0 = today
    pub day_offset: usize,
    pub date: NaiveDate,
    pub weather_code: i32,
    pub condition: WeatherCondition,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub relative_humidity_mean: Option<f64>,
}

// open-meteo returns one array per variable rather than one object per day
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyColumns,
}

#[derive(Debug, Deserialize)]
struct DailyColumns {
    time: Vec<String>,
    #[serde(default)]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
}

#[derive(Clone)]
pub struct ForecastFetcher {
    client: reqwest::Client,
    url: String,
    forecast_days: u32,
}

impl ForecastFetcher {
    pub fn new(url: String, forecast_days: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            forecast_days,
        }
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastDay>, FetchError> {
        debug!("Requesting {}-day forecast", self.forecast_days);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
            ])
            .send()
            .await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::from_status(response.status(), &self.url));
        }

        let body = response.text().await?;
        parse_forecast(&body)
    }
}

/// Zip open-meteo's daily columns into one entry per day
///
/// Columns shorter than `time` leave the missing values as `None`. Days
/// whose date cannot be parsed are dropped, keeping their `day_offset`
/// gap.
pub fn parse_forecast(body: &str) -> Result<Vec<ForecastDay>, FetchError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let daily = response.daily;

    let mut days = Vec::with_capacity(daily.time.len());
    for (i, raw_date) in daily.time.iter().enumerate() {
        let date = match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!("Skipping forecast day '{}': {}", raw_date, e);
                continue;
            }
        };

        let weather_code = daily.weathercode.get(i).copied().flatten().unwrap_or(-1);
        days.push(ForecastDay {
            day_offset: i,
            date,
            weather_code,
            condition: WeatherCondition::from_code(weather_code),
            temperature_max: daily.temperature_2m_max.get(i).copied().flatten(),
            temperature_min: daily.temperature_2m_min.get(i).copied().flatten(),
            relative_humidity_mean: daily.relative_humidity_2m_mean.get(i).copied().flatten(),
        });
    }

    debug!("Parsed {} forecast days", days.len());
    Ok(days)
}

/// Relative humidity for today, if the forecast has a usable day 0
///
/// A later day's humidity is never substituted for today's.
pub fn todays_humidity(days: &[ForecastDay]) -> Option<f64> {
    days.first()
        .filter(|day| day.day_offset == 0)
        .and_then(|day| day.relative_humidity_mean)
}
