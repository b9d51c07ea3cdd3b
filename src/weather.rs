use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::debug;

use crate::config::WeatherConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: WeatherLocation,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherLocation {
    pub name: String,
    /// Local wall-clock time at the queried location, e.g. "2025-06-10 12:15".
    pub localtime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp_c: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub text: String,
}

/// Non-2xx responses carry `{"error":{"message":...}}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    Upstream(String),
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError>;
}

pub struct HttpWeatherClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    lang: String,
}

impl HttpWeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            lang: config.lang.clone(),
        }
    }
}

#[async_trait]
impl WeatherClient for HttpWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/current.json", self.api_url);
        let q = format!("{},{}", lat, lon);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ApiError>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("weather service returned {}", status));
            return Err(WeatherError::Upstream(message));
        }

        let snapshot = resp.json::<WeatherSnapshot>().await?;
        debug!(
            location = %snapshot.location.name,
            temp_c = snapshot.current.temp_c,
            condition = %snapshot.current.condition.text,
            "weather fetched"
        );
        Ok(snapshot)
    }
}

/// Parse the provider's `localtime` field.
///
/// weatherapi.com emits "YYYY-MM-DD H:MM" (hour unpadded before 10:00);
/// an ISO "T" separator and trailing seconds are tolerated as well.
pub fn parse_localtime(raw: &str) -> Option<PrimitiveDateTime> {
    lazy_static! {
        static ref LOCALTIME_RE: Regex =
            Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[ T](\d{1,2}):(\d{2})").unwrap();
    }
    let caps = LOCALTIME_RE.captures(raw.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u8 = caps[2].parse().ok()?;
    let day: u8 = caps[3].parse().ok()?;
    let hour: u8 = caps[4].parse().ok()?;
    let minute: u8 = caps[5].parse().ok()?;

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

#[cfg(test)]
mod weather_tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn snapshot_deserializes_from_provider_json() {
        let raw = r#"{
            "location": {"name": "Santiago", "localtime": "2025-06-10 12:15"},
            "current": {"temp_c": 8.0, "condition": {"text": "Nublado"}}
        }"#;
        let snapshot: WeatherSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.location.name, "Santiago");
        assert_eq!(snapshot.current.temp_c, 8.0);
        assert_eq!(snapshot.current.condition.text, "Nublado");
    }

    #[test]
    fn error_body_exposes_message() {
        let raw = r#"{"error": {"code": 1006, "message": "No matching location found."}}"#;
        let body: ApiError = serde_json::from_str(raw).unwrap();
        assert_eq!(body.error.message, "No matching location found.");
    }

    #[test]
    fn localtime_parses_provider_format() {
        let parsed = parse_localtime("2025-06-10 12:15").unwrap();
        assert_eq!(parsed.date(), date!(2025 - 06 - 10));
        assert_eq!(parsed.time(), time!(12:15));
    }

    #[test]
    fn localtime_parses_unpadded_hour_and_iso_separator() {
        let unpadded = parse_localtime("2025-06-10 9:05").unwrap();
        assert_eq!(unpadded.time(), time!(9:05));

        let iso = parse_localtime("2025-06-10T12:15:00").unwrap();
        assert_eq!(iso.time(), time!(12:15));
    }

    #[test]
    fn localtime_rejects_garbage() {
        assert!(parse_localtime("").is_none());
        assert!(parse_localtime("mañana temprano").is_none());
        assert!(parse_localtime("2025-13-40 99:99").is_none());
    }
}
