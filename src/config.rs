use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use log::{error, warn};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::fetch::DEFAULT_ENDPOINT;

pub const DEFAULT_INTERVAL_MINUTES: f64 = 60.0;
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const SUPPORTED_SENSOR: &str = "air_quality";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key not specified")]
    MissingApiKey,
    #[error("station is not specified")]
    MissingStation,
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// Accessory configuration exactly as the host hands it over.
///
/// Everything except the credentials is optional and loosely typed; bad
/// values are repaired during validation rather than rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessoryConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub sensor: Option<String>,
    #[serde(default)]
    pub polling: Option<Value>,
    #[serde(default)]
    pub interval: Option<Value>,
    #[serde(default)]
    pub show_last_updated_date: Option<Value>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<Value>,
}

/// Validated engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub name: String,
    pub api_key: String,
    pub station: String,
    pub polling: bool,
    pub interval: Duration,
    pub show_last_updated: bool,
    pub endpoint: Url,
    pub request_timeout: Duration,
}

impl EngineConfig {
    /// Minimal settings with every optional knob at its default.
    pub fn new(api_key: impl Into<String>, station: impl Into<String>) -> Result<Self, ConfigError> {
        Self::from_accessory(&AccessoryConfig {
            api_key: Some(api_key.into()),
            station: Some(station.into()),
            ..Default::default()
        })
    }

    pub fn from_accessory(raw: &AccessoryConfig) -> Result<Self, ConfigError> {
        let api_key = non_empty(raw.api_key.as_deref()).ok_or(ConfigError::MissingApiKey)?;
        let station = non_empty(raw.station.as_deref()).ok_or(ConfigError::MissingStation)?;

        match raw.sensor.as_deref() {
            None | Some(SUPPORTED_SENSOR) => {}
            Some(other) => {
                error!("Unsupported sensor '{other}' specified, defaulting to {SUPPORTED_SENSOR}")
            }
        }

        let polling = match &raw.polling {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                warn!("Unsupported option {other} specified for polling, defaulting to false");
                false
            }
        };

        let interval_minutes = match raw.interval.as_ref().and_then(positive_number) {
            Some(minutes) => minutes,
            None => {
                warn!("interval is not specified or invalid, defaulting to {DEFAULT_INTERVAL_MINUTES}");
                DEFAULT_INTERVAL_MINUTES
            }
        };

        let show_last_updated = match &raw.show_last_updated_date {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                warn!("Unsupported option {other} specified for show_last_updated_date, defaulting to false");
                false
            }
        };

        let timeout_secs = raw
            .timeout_secs
            .as_ref()
            .and_then(positive_number)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let endpoint_text = raw.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(endpoint_text)
            .map_err(|_| ConfigError::InvalidEndpoint(endpoint_text.to_string()))?;

        Ok(Self {
            name: non_empty(raw.name.as_deref()).unwrap_or_else(|| station.clone()),
            api_key,
            station,
            polling,
            interval: Duration::from_secs_f64(interval_minutes * 60.0),
            show_last_updated,
            endpoint,
            request_timeout: Duration::from_secs_f64(timeout_secs),
        })
    }
}

/// Read the accessory JSON from disk.
pub fn load_accessory_config(path: &Path) -> Result<AccessoryConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config in {}", path.display()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Positive finite number from a JSON number or numeric string.
fn positive_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    // Upper bound keeps `Duration::from_secs_f64` from overflowing.
    (number.is_finite() && number > 0.0 && number < 5.0e7).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> AccessoryConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn requires_api_key() {
        let raw = parse(json!({ "station": "Seoul" }));
        assert_eq!(EngineConfig::from_accessory(&raw).unwrap_err(), ConfigError::MissingApiKey);

        let raw = parse(json!({ "station": "Seoul", "api_key": "  " }));
        assert_eq!(EngineConfig::from_accessory(&raw).unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn requires_station() {
        let raw = parse(json!({ "api_key": "key" }));
        assert_eq!(EngineConfig::from_accessory(&raw).unwrap_err(), ConfigError::MissingStation);
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::new("key", "Seoul").unwrap();
        assert!(!config.polling);
        assert!(!config.show_last_updated);
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.name, "Seoul");
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn reads_full_config() {
        let raw = parse(json!({
            "accessory": "AirKorea",
            "name": "Balcony",
            "api_key": "key",
            "station": "종로구",
            "sensor": "air_quality",
            "polling": true,
            "interval": 15,
            "show_last_updated_date": true,
            "timeout_secs": 3
        }));
        let config = EngineConfig::from_accessory(&raw).unwrap();

        assert_eq!(config.name, "Balcony");
        assert!(config.polling);
        assert!(config.show_last_updated);
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_polling_degrades_to_false() {
        let raw = parse(json!({ "api_key": "k", "station": "s", "polling": "yes" }));
        assert!(!EngineConfig::from_accessory(&raw).unwrap().polling);

        let raw = parse(json!({ "api_key": "k", "station": "s", "polling": 1 }));
        assert!(!EngineConfig::from_accessory(&raw).unwrap().polling);
    }

    #[test]
    fn invalid_interval_degrades_to_sixty_minutes() {
        for interval in [json!(0), json!(-5), json!("soon"), json!(null), json!([1])] {
            let raw = parse(json!({ "api_key": "k", "station": "s", "interval": interval }));
            assert_eq!(
                EngineConfig::from_accessory(&raw).unwrap().interval,
                Duration::from_secs(3600)
            );
        }
    }

    #[test]
    fn numeric_string_interval_is_accepted() {
        let raw = parse(json!({ "api_key": "k", "station": "s", "interval": "30" }));
        assert_eq!(
            EngineConfig::from_accessory(&raw).unwrap().interval,
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn unsupported_sensor_is_not_fatal() {
        let raw = parse(json!({ "api_key": "k", "station": "s", "sensor": "weather" }));
        assert!(EngineConfig::from_accessory(&raw).is_ok());
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let raw = parse(json!({ "api_key": "k", "station": "s", "endpoint": "not a url" }));
        assert!(matches!(
            EngineConfig::from_accessory(&raw),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("airkorea-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"api_key": "k", "station": "Seoul", "polling": true}"#).unwrap();

        let raw = load_accessory_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(raw.station.as_deref(), Some("Seoul"));
        assert_eq!(raw.polling, Some(Value::Bool(true)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_accessory_config(Path::new("/nonexistent/airkorea.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/airkorea.json"));
    }
}
