use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::fetch::payload::{parse_data_time, Measurement};
use crate::quality::{
    classify, parse_index,
    units::{
        convert_carbon_monoxide, convert_nitrogen_dioxide, convert_ozone, convert_pm10,
        convert_pm25, convert_sulphur_dioxide,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Unknown,
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

impl Default for Grade {
    fn default() -> Self {
        Grade::Unknown
    }
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Unknown => "UNKNOWN",
            Grade::Excellent => "EXCELLENT",
            Grade::Good => "GOOD",
            Grade::Fair => "FAIR",
            Grade::Inferior => "INFERIOR",
            Grade::Poor => "POOR",
        }
    }

    /// Value of the HomeKit `AirQuality` characteristic (0 = unknown, 5 = poor).
    pub fn characteristic_value(&self) -> u8 {
        match self {
            Grade::Unknown => 0,
            Grade::Excellent => 1,
            Grade::Good => 2,
            Grade::Fair => 3,
            Grade::Inferior => 4,
            Grade::Poor => 5,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one fetch cycle. A new one is built every cycle, success or not.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollutantReading {
    /// Composite index as reported, unitless.
    pub aqi_index: Option<f64>,
    pub grade: Grade,
    /// µg/m³
    pub pm10: Option<f64>,
    /// µg/m³
    pub pm25: Option<f64>,
    /// ppb
    pub ozone: Option<f64>,
    /// ppb
    pub nitrogen_dioxide: Option<f64>,
    /// ppb
    pub sulphur_dioxide: Option<f64>,
    /// ppm, unscaled
    pub carbon_monoxide: Option<f64>,
    /// Station-local measurement time.
    pub observed_at: Option<NaiveDateTime>,
    /// Station name echoed back by the service.
    pub station_name: Option<String>,
    pub active: bool,
}

impl Default for PollutantReading {
    fn default() -> Self {
        Self {
            aqi_index: None,
            grade: Grade::Unknown,
            pm10: None,
            pm25: None,
            ozone: None,
            nitrogen_dioxide: None,
            sulphur_dioxide: None,
            carbon_monoxide: None,
            observed_at: None,
            station_name: None,
            active: false,
        }
    }
}

impl PollutantReading {
    /// Build an active reading from a validated record. Bad fields become
    /// absent individually; they never fail the whole reading.
    pub fn from_measurement(measurement: &Measurement) -> Self {
        let record = &measurement.record;
        let aqi_index = parse_index(record.khai_value.as_deref());

        Self {
            aqi_index,
            grade: classify(aqi_index),
            pm10: convert_pm10(record.pm10_value.as_deref()),
            pm25: convert_pm25(record.pm25_value.as_deref()),
            ozone: convert_ozone(record.o3_value.as_deref()),
            nitrogen_dioxide: convert_nitrogen_dioxide(record.no2_value.as_deref()),
            sulphur_dioxide: convert_sulphur_dioxide(record.so2_value.as_deref()),
            carbon_monoxide: convert_carbon_monoxide(record.co_value.as_deref()),
            observed_at: record.data_time.as_deref().and_then(parse_data_time),
            station_name: measurement.station_name.clone(),
            active: true,
        }
    }

    /// Reading for a failed cycle: last-known values, marked inactive.
    pub fn inactive(previous: Option<&PollutantReading>) -> Self {
        match previous {
            Some(prev) => Self {
                active: false,
                ..prev.clone()
            },
            None => Self::default(),
        }
    }

    /// Number of pollutant fields carrying a value.
    pub fn measured_count(&self) -> usize {
        [
            self.pm10,
            self.pm25,
            self.ozone,
            self.nitrogen_dioxide,
            self.sulphur_dioxide,
            self.carbon_monoxide,
        ]
        .iter()
        .filter(|value| value.is_some())
        .count()
    }
}
