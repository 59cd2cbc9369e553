//! The surface the host accessory layer sees.

use chrono::{Datelike, NaiveDateTime, Timelike};
use log::info;

use crate::config::EngineConfig;
use crate::models::PollutantReading;

pub const MANUFACTURER: &str = "AirKorea";
pub const MODEL: &str = "Air Quality Sensor";
pub const FIRMWARE_REVISION: &str = env!("CARGO_PKG_VERSION");

/// Receives every published reading.
///
/// `display_name` is set when the accessory is configured to show the
/// measurement time as its name.
pub trait ReadingSubscriber: Send + Sync + 'static {
    fn publish(&self, reading: &PollutantReading, display_name: Option<&str>);
}

/// Static accessory information characteristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: String,
    pub firmware_revision: &'static str,
}

impl AccessoryInfo {
    pub fn from_config(config: &EngineConfig) -> Self {
        let name = if config.show_last_updated {
            last_updated_label(None)
        } else {
            config.name.clone()
        };

        Self {
            name,
            manufacturer: MANUFACTURER,
            model: MODEL,
            serial_number: config.station.clone(),
            firmware_revision: FIRMWARE_REVISION,
        }
    }
}

/// "<day>일 <hour>시 현재", e.g. `5일 14시 현재` for the 5th at 14:00.
pub fn last_updated_label(observed_at: Option<NaiveDateTime>) -> String {
    match observed_at {
        Some(at) => format!("{}일 {}시 현재", at.day(), at.hour()),
        None => "-일 -시 현재".to_string(),
    }
}

/// Subscriber that writes each reading to the log.
pub struct LogSubscriber;

impl ReadingSubscriber for LogSubscriber {
    fn publish(&self, reading: &PollutantReading, display_name: Option<&str>) {
        if !reading.active {
            info!("air quality inactive, holding last known values");
            return;
        }

        let fmt = |value: Option<f64>| match value {
            Some(v) => format!("{v}"),
            None => "-".to_string(),
        };

        info!(
            "{}air quality {} (index {}, {}/6 measured) pm10={} pm25={} o3={} no2={} so2={} co={}",
            display_name.map(|name| format!("[{name}] ")).unwrap_or_default(),
            reading.grade,
            fmt(reading.aqi_index),
            reading.measured_count(),
            fmt(reading.pm10),
            fmt(reading.pm25),
            fmt(reading.ozone),
            fmt(reading.nitrogen_dioxide),
            fmt(reading.sulphur_dioxide),
            fmt(reading.carbon_monoxide),
        );
    }
}
