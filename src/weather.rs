//! Live weather lookup through the Open-Meteo geocoding and forecast APIs.

use crate::entry::WeatherSnapshot;
use crate::error::LookupError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Place {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    weather_code: Option<i64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Result<Self, LookupError> {
        Ok(WeatherClient {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        })
    }

    /// Resolves `city` to coordinates, then reads the current conditions there.
    pub async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LookupError::EmptyCity);
        }

        debug!(city, "Looking up location");
        let body = self
            .get_text(&self.geocoding_url, &[("name", city.to_string()), ("count", "1".to_string())])
            .await?;
        let place = parse_place(&body, city)?;

        let body = self
            .get_text(
                &self.forecast_url,
                &[
                    ("latitude", place.latitude.to_string()),
                    ("longitude", place.longitude.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;
        let current = parse_current(&body)?;

        let snapshot = build_snapshot(&current, &place, city);
        info!(
            location = snapshot.location_name.as_deref().unwrap_or(city),
            weather = %snapshot.weather_type,
            "Fetched weather"
        );
        Ok(snapshot)
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, LookupError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }
        Ok(response.text().await?)
    }
}

fn parse_place(body: &str, city: &str) -> Result<Place, LookupError> {
    let response: GeocodingResponse = serde_json::from_str(body)?;
    response
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| LookupError::NoMatch(city.to_string()))
}

fn parse_current(body: &str) -> Result<CurrentConditions, LookupError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    response.current.ok_or(LookupError::NoCurrentWeather)
}

fn build_snapshot(current: &CurrentConditions, place: &Place, city: &str) -> WeatherSnapshot {
    let weather_type = current
        .weather_code
        .map_or("Unknown", weather_type_for_code);

    let location_name = match (&place.name, &place.country) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.clone(),
        _ => city.to_string(),
    };

    WeatherSnapshot {
        icon: icon_for_type(weather_type).to_string(),
        temperature: format!("{}°C", current.temperature_2m.round() as i64),
        weather_type: weather_type.to_string(),
        humidity: current.relative_humidity_2m.map(|h| h.clamp(0.0, 100.0)),
        wind_speed: current.wind_speed_10m.map(|w| w.max(0.0)),
        location_name: Some(location_name),
    }
}

/// Label for a WMO weather interpretation code.
pub fn weather_type_for_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Clouds",
        45 | 48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 | 80..=82 => "Rain",
        71..=77 => "Snow",
        c if c >= 95 => "Thunderstorm",
        _ => "Unknown",
    }
}

pub fn icon_for_type(weather_type: &str) -> &'static str {
    let value = weather_type.to_lowercase();
    if value.contains("clear") {
        "☀️"
    } else if value.contains("cloud") {
        "⛅"
    } else if value.contains("rain") || value.contains("drizzle") {
        "🌧️"
    } else if value.contains("snow") {
        "❄️"
    } else if value.contains("thunder") {
        "⛈️"
    } else if value.contains("fog") {
        "🌫️"
    } else {
        "⛅"
    }
}
