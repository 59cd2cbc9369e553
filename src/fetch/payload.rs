//! Wire types for the real-time measurement endpoint.
//!
//! ```text
//! {
//!   "list": [{ "khaiValue": "80", "pm10Value": "30", "o3Value": "0.05", ..., "dataTime": "2024-01-01 09:00" }],
//!   "parm": { "stationName": "종로구", ... }
//! }
//! ```
//!
//! Every measurement is a string, `"-"` when not measured. Fields are read
//! leniently: a number or null where a string is expected does not reject
//! the whole payload.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::FetchResult;

const DATA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
pub struct MeasurementResponse {
    pub list: Vec<RawMeasurement>,
    #[serde(default)]
    pub parm: Option<StationParams>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub station_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawMeasurement {
    #[serde(default, deserialize_with = "lenient_text")]
    pub khai_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pm10_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pm25_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub o3_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub no2_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub so2_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub co_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub data_time: Option<String>,
}

/// The most recent record plus the station name the service echoed back.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub record: RawMeasurement,
    pub station_name: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Validate a 200 response body. Never fails past this point: bad JSON and
/// empty record lists come back as [`FetchResult::MalformedData`].
pub fn parse_payload(body: &[u8]) -> FetchResult {
    let response: MeasurementResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(err) => return FetchResult::MalformedData(format!("invalid JSON payload: {err}")),
    };

    let station_name = response.parm.and_then(|parm| parm.station_name);
    match response.list.into_iter().next() {
        Some(record) => FetchResult::Success(Measurement {
            record,
            station_name,
        }),
        None => FetchResult::MalformedData("payload contains no records".into()),
    }
}

/// Parse `dataTime` (`YYYY-MM-DD HH:MM`, station-local).
///
/// The service reports midnight as `24:00` of the previous day.
pub fn parse_data_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, DATA_TIME_FORMAT) {
        return Some(parsed);
    }

    let (date, time) = raw.split_once(' ')?;
    if time.trim() != "24:00" {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let midnight = date.and_time(NaiveTime::MIN);
    midnight.checked_add_signed(Duration::days(1))
}
