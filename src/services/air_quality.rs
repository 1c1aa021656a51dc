// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenWeather air quality client.
//!
//! A lookup is two calls: geocode the place name, then fetch the current
//! pollution reading at those coordinates.

use crate::config::Config;
use crate::error::AppError;
use crate::time_utils::format_utc_rfc3339;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const STATION: &str = "OpenWeather";

/// OpenWeather index (1 = good .. 5 = very poor) to a 0-400 scale.
const AQI_SCALE: [u32; 6] = [0, 50, 100, 200, 300, 400];

/// Pollutant concentrations (μg/m³).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pollutants {
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    pub co: Option<f64>,
}

/// Air quality snapshot for a place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReport {
    pub aqi: u32,
    pub city: String,
    pub state: String,
    pub country: String,
    /// RFC 3339 time of the reading, or empty if unknown
    pub timestamp: String,
    pub station: String,
    pub pollutants: Pollutants,
}

/// Map an OpenWeather index to the reported scale. Out-of-range is 0.
pub fn scale_aqi(index: i64) -> u32 {
    usize::try_from(index)
        .ok()
        .and_then(|i| AQI_SCALE.get(i))
        .copied()
        .unwrap_or(0)
}

/// OpenWeather API client.
#[derive(Clone)]
pub struct AirQualityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AirQualityClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            config.openweather_base_url.clone(),
            config.openweather_api_key.clone(),
        )
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Current air quality for a place name.
    pub async fn lookup(&self, location: &str) -> Result<AirQualityReport, AppError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::validation(
                "location",
                "Location parameter is required",
            ));
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("OpenWeather API key not configured"))?;

        let places: Vec<GeoPlace> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", location), ("limit", "1"), ("appid", api_key)],
            )
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {}", location)))?;

        let lat = place.lat.to_string();
        let lon = place.lon.to_string();
        let pollution: PollutionResponse = self
            .get_json(
                "/data/2.5/air_pollution",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", api_key)],
            )
            .await?;

        let reading = pollution.list.into_iter().next().ok_or_else(|| {
            AppError::NotFound("No air quality data found for this location".to_string())
        })?;

        tracing::debug!(
            location,
            city = %place.name,
            index = reading.main.aqi,
            "Air quality fetched"
        );

        Ok(build_report(place, reading))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("OpenWeather request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "OpenWeather HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("OpenWeather JSON parse error: {}", e)))
    }
}

fn build_report(place: GeoPlace, reading: PollutionReading) -> AirQualityReport {
    let timestamp = reading
        .dt
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
        .map(format_utc_rfc3339)
        .unwrap_or_default();

    let c = reading.components;
    AirQualityReport {
        aqi: scale_aqi(reading.main.aqi),
        city: place.name,
        state: place.state.unwrap_or_default(),
        country: place.country.unwrap_or_default(),
        timestamp,
        station: STATION.to_string(),
        pollutants: Pollutants {
            pm25: c.pm2_5,
            pm10: c.pm10,
            no2: c.no2,
            so2: c.so2,
            o3: c.o3,
            co: c.co,
        },
    }
}

#[derive(Debug, Deserialize)]
struct GeoPlace {
    name: String,
    lat: f64,
    lon: f64,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionReading>,
}

#[derive(Debug, Deserialize)]
struct PollutionReading {
    dt: Option<i64>,
    main: PollutionIndex,
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Deserialize)]
struct PollutionIndex {
    aqi: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    no2: Option<f64>,
    so2: Option<f64>,
    o3: Option<f64>,
    co: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_aqi() {
        assert_eq!(scale_aqi(1), 50);
        assert_eq!(scale_aqi(3), 200);
        assert_eq!(scale_aqi(5), 400);
        assert_eq!(scale_aqi(0), 0);
        assert_eq!(scale_aqi(6), 0);
        assert_eq!(scale_aqi(-1), 0);
    }

    #[test]
    fn test_build_report() {
        let place = GeoPlace {
            name: "Pune".to_string(),
            lat: 18.52,
            lon: 73.85,
            state: Some("Maharashtra".to_string()),
            country: Some("IN".to_string()),
        };
        let reading: PollutionReading = serde_json::from_value(serde_json::json!({
            "dt": 1_700_000_000,
            "main": { "aqi": 2 },
            "components": { "pm2_5": 12.5, "pm10": 20.0, "co": 230.3 }
        }))
        .unwrap();

        let report = build_report(place, reading);
        assert_eq!(report.aqi, 100);
        assert_eq!(report.city, "Pune");
        assert_eq!(report.timestamp, "2023-11-14T22:13:20Z");
        assert_eq!(report.station, "OpenWeather");
        assert_eq!(report.pollutants.pm25, Some(12.5));
        assert_eq!(report.pollutants.no2, None);
    }

    #[test]
    fn test_missing_state_and_time() {
        let place = GeoPlace {
            name: "Nowhere".to_string(),
            lat: 0.0,
            lon: 0.0,
            state: None,
            country: None,
        };
        let reading: PollutionReading =
            serde_json::from_value(serde_json::json!({ "main": { "aqi": 9 } })).unwrap();

        let report = build_report(place, reading);
        assert_eq!(report.aqi, 0);
        assert_eq!(report.state, "");
        assert_eq!(report.timestamp, "");
    }

    #[tokio::test]
    async fn test_lookup_input_errors() {
        let client = AirQualityClient::with_base_url("http://127.0.0.1:9", None);

        let err = client.lookup("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = client.lookup("Pune").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
