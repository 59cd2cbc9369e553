//! Raw concentration strings → exposed units.
//!
//! The station reports every value as text. `"-"` marks a pollutant the
//! station did not measure this hour; anything else that fails to parse is
//! treated the same way. Absence stays `None`, never zero.

/// Marker the station uses for "not measured".
pub const NOT_MEASURED: &str = "-";

/// Gas readings arrive in ppm and are exposed in ppb.
const PPM_TO_PPB: f64 = 1000.0;

/// Parse one raw field into a finite number, or `None`.
pub fn parse_measurement(raw: Option<&str>) -> Option<f64> {
    let text = raw?.trim();
    if text.is_empty() || text == NOT_MEASURED {
        return None;
    }

    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn scaled(raw: Option<&str>, factor: f64) -> Option<f64> {
    parse_measurement(raw)
        .map(|value| value * factor)
        .filter(|value| value.is_finite())
}

/// PM10 in µg/m³, passed through.
pub fn convert_pm10(raw: Option<&str>) -> Option<f64> {
    parse_measurement(raw)
}

/// PM2.5 in µg/m³, passed through.
pub fn convert_pm25(raw: Option<&str>) -> Option<f64> {
    parse_measurement(raw)
}

/// Carbon monoxide as reported. Unlike the other gases it is not rescaled.
pub fn convert_carbon_monoxide(raw: Option<&str>) -> Option<f64> {
    parse_measurement(raw)
}

pub fn convert_ozone(raw: Option<&str>) -> Option<f64> {
    scaled(raw, PPM_TO_PPB)
}

pub fn convert_nitrogen_dioxide(raw: Option<&str>) -> Option<f64> {
    scaled(raw, PPM_TO_PPB)
}

pub fn convert_sulphur_dioxide(raw: Option<&str>) -> Option<f64> {
    scaled(raw, PPM_TO_PPB)
}
