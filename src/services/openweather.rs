//! OpenWeatherMap client.
//!
//! Fetches current conditions and the 5-day/3-hour forecast for a fixed set
//! of growing regions. Responses are deserialized into typed structs and
//! condensed into [`WeatherReading`] / [`ForecastDay`] values that the
//! scoring model consumes.
//!
//! See: https://openweathermap.org/current and /forecast5

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// A named growing region the dashboard serves.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub key: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// The fixed set of regions weather is served for.
pub static REGIONS: &[Region] = &[
    Region {
        key: "punjab",
        name: "Punjab",
        lat: 30.9010,
        lon: 75.8573,
    },
    Region {
        key: "haryana",
        name: "Haryana",
        lat: 29.0588,
        lon: 76.0856,
    },
    Region {
        key: "madhya-pradesh",
        name: "Madhya Pradesh",
        lat: 23.2599,
        lon: 77.4126,
    },
    Region {
        key: "maharashtra",
        name: "Maharashtra",
        lat: 19.7515,
        lon: 75.7139,
    },
    Region {
        key: "west-bengal",
        name: "West Bengal",
        lat: 22.9868,
        lon: 87.8550,
    },
    Region {
        key: "karnataka",
        name: "Karnataka",
        lat: 15.3173,
        lon: 75.7139,
    },
];

/// Resolve a region by key or display name, case-insensitively.
pub fn find_region(name: &str) -> Option<&'static Region> {
    let normalized = name.trim().to_lowercase();
    REGIONS
        .iter()
        .find(|r| r.key == normalized || r.name.to_lowercase() == normalized)
}

/// A current-conditions snapshot for one region.
///
/// Transient: fetched per request, never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherReading {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// Feels-like temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity percentage
    pub humidity_pct: f64,
    /// Condition group (e.g. "Rain", "Clear")
    pub condition: String,
    /// Condition detail (e.g. "light rain")
    pub description: String,
    /// Wind speed in metres per second
    pub wind_speed_ms: f64,
    /// Sea-level pressure in hPa
    pub pressure_hpa: f64,
    /// Observation timestamp
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Combined lowercase condition text for keyword matching.
    pub fn condition_text(&self) -> String {
        format!("{} {}", self.condition, self.description).to_lowercase()
    }
}

/// One day of the 5-day outlook, condensed from 3-hourly entries.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastDay {
    /// Forecast date
    pub date: NaiveDate,
    /// Midday temperature in Celsius
    pub temperature_c: f64,
    /// Condition group (e.g. "Clouds")
    pub condition: String,
    /// Condition detail (e.g. "scattered clouds")
    pub description: String,
    /// Relative humidity percentage
    pub humidity_pct: f64,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: Option<OwmWind>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: f64,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastEntry {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmCondition>,
}

/// Client for the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch current conditions for a region.
    pub async fn current(&self, region: &Region) -> Result<WeatherReading, AppError> {
        let url = format!(
            "{}/data/2.5/weather?lat={:.4}&lon={:.4}&units=metric&appid={}",
            self.base_url, region.lat, region.lon, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("weather request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "weather service returned HTTP {}",
                response.status()
            )));
        }

        let body: OwmCurrentResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("weather JSON parse error: {}", e))
        })?;

        Ok(reading_from_current(&body))
    }

    /// Fetch the 5-day outlook for a region, one entry per day.
    pub async fn forecast(&self, region: &Region) -> Result<Vec<ForecastDay>, AppError> {
        let url = format!(
            "{}/data/2.5/forecast?lat={:.4}&lon={:.4}&units=metric&appid={}",
            self.base_url, region.lat, region.lon, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("forecast request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "weather service returned HTTP {}",
                response.status()
            )));
        }

        let body: OwmForecastResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("forecast JSON parse error: {}", e))
        })?;

        Ok(condense_forecast(&body))
    }
}

/// Convert a current-conditions response into a [`WeatherReading`].
fn reading_from_current(body: &OwmCurrentResponse) -> WeatherReading {
    let (condition, description) = body
        .weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));

    WeatherReading {
        temperature_c: body.main.temp,
        feels_like_c: body.main.feels_like.unwrap_or(body.main.temp),
        humidity_pct: body.main.humidity,
        condition,
        description,
        wind_speed_ms: body.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0),
        pressure_hpa: body.main.pressure.unwrap_or(1013.0),
        observed_at: DateTime::from_timestamp(body.dt, 0).unwrap_or_else(Utc::now),
    }
}

/// Condense 3-hourly forecast entries into one entry per day.
///
/// Pure function (no I/O) — picks the entry closest to midday for each of
/// the first five distinct dates.
fn condense_forecast(body: &OwmForecastResponse) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = Vec::new();
    let mut best_hour_distance: Vec<i64> = Vec::new();

    for entry in &body.list {
        let Some(when) = DateTime::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let date = when.date_naive();
        let hour_distance = (when.hour() as i64 - 12).abs();

        let (condition, description) = entry
            .weather
            .first()
            .map(|w| (w.main.clone(), w.description.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));

        match days.iter().position(|d| d.date == date) {
            Some(i) => {
                if hour_distance < best_hour_distance[i] {
                    days[i] = ForecastDay {
                        date,
                        temperature_c: entry.main.temp,
                        condition,
                        description,
                        humidity_pct: entry.main.humidity,
                    };
                    best_hour_distance[i] = hour_distance;
                }
            }
            None => {
                if days.len() >= 5 {
                    continue;
                }
                days.push(ForecastDay {
                    date,
                    temperature_c: entry.main.temp,
                    condition,
                    description,
                    humidity_pct: entry.main.humidity,
                });
                best_hour_distance.push(hour_distance);
            }
        }
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 28.3, "feels_like": 31.0, "humidity": 74.0, "pressure": 1006.0},
            "wind": {"speed": 3.4},
            "dt": 1_756_700_000
        })
    }

    #[test]
    fn test_find_region_case_insensitive() {
        assert!(find_region("punjab").is_some());
        assert!(find_region("Punjab").is_some());
        assert!(find_region(" MADHYA-PRADESH ").is_some());
        assert!(find_region("Madhya Pradesh").is_some());
    }

    #[test]
    fn test_find_region_unknown() {
        assert!(find_region("atlantis").is_none());
        assert!(find_region("").is_none());
    }

    #[test]
    fn test_condition_text_combines_fields() {
        let body: OwmCurrentResponse = serde_json::from_value(current_body()).unwrap();
        let reading = reading_from_current(&body);
        assert_eq!(reading.condition_text(), "rain light rain");
    }

    #[test]
    fn test_reading_from_current_defaults() {
        let body: OwmCurrentResponse = serde_json::from_value(serde_json::json!({
            "weather": [],
            "main": {"temp": 20.0, "humidity": 50.0},
            "dt": 1_756_700_000
        }))
        .unwrap();
        let reading = reading_from_current(&body);
        assert_eq!(reading.condition, "Unknown");
        assert_eq!(reading.feels_like_c, 20.0);
        assert_eq!(reading.wind_speed_ms, 0.0);
        assert_eq!(reading.pressure_hpa, 1013.0);
    }

    #[test]
    fn test_condense_forecast_one_entry_per_day() {
        // Two days, three 3-hourly entries each; midday entries should win.
        let mk = |dt: i64, temp: f64| {
            serde_json::json!({
                "dt": dt,
                "main": {"temp": temp, "humidity": 60.0},
                "weather": [{"main": "Clouds", "description": "scattered clouds"}]
            })
        };
        // 2025-09-01 03:00, 12:00, 21:00 UTC and same for 09-02
        let body: OwmForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [
                mk(1_756_695_600, 22.0), mk(1_756_728_000, 30.0), mk(1_756_760_400, 24.0),
                mk(1_756_782_000, 21.0), mk(1_756_814_400, 29.0), mk(1_756_846_800, 23.0),
            ]
        }))
        .unwrap();

        let days = condense_forecast(&body);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temperature_c, 30.0);
        assert_eq!(days[1].temperature_c, 29.0);
    }

    #[tokio::test]
    async fn test_current_fetches_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let reading = client.current(&REGIONS[0]).await.unwrap();
        assert_eq!(reading.temperature_c, 28.3);
        assert_eq!(reading.condition, "Rain");
        assert_eq!(reading.humidity_pct, 74.0);
    }

    #[tokio::test]
    async fn test_current_maps_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let err = client.current(&REGIONS[0]).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }

    #[tokio::test]
    async fn test_current_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        assert!(client.current(&REGIONS[0]).await.is_err());
    }
}
