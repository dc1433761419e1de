use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::InputError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse one component typed by the user. Only plain `.`-decimal notation
    /// is accepted, independent of the host locale.
    pub fn parse_component(field: &'static str, input: &str) -> Result<f64, InputError> {
        input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| InputError { field, input: input.to_string() })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// One hour bucket of the forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyEntry {
    pub time: DateTime<Utc>,
    /// `None` when the API reported `null` for this hour.
    pub probability: Option<f64>,
}

/// Hourly precipitation probabilities in ascending time order.
///
/// Built by zipping the `time` and `precipitation_probability` arrays of the
/// API response; arrays of different length are rejected while parsing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawHourly")]
pub struct HourlyForecast {
    entries: Vec<HourlyEntry>,
}

impl HourlyForecast {
    pub fn new(entries: Vec<HourlyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HourlyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

impl TryFrom<RawHourly> for HourlyForecast {
    type Error = String;

    fn try_from(raw: RawHourly) -> Result<Self, Self::Error> {
        if raw.time.len() != raw.precipitation_probability.len() {
            return Err(format!(
                "hourly data has {} timestamps but {} probabilities",
                raw.time.len(),
                raw.precipitation_probability.len()
            ));
        }

        let entries = raw
            .time
            .iter()
            .zip(raw.precipitation_probability)
            .map(|(time, probability)| {
                parse_hour(time)
                    .map(|time| HourlyEntry { time, probability })
                    .ok_or_else(|| format!("invalid hourly timestamp '{time}'"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }
}

/// Forecast API answer. Everything is optional: an empty object is a valid
/// response that simply carries no weather data.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub hourly: Option<HourlyForecast>,
}

impl ForecastResponse {
    /// Decode a response body, matching object keys case-insensitively.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        serde_json::from_value(lowercase_keys(value))
    }

    /// Coordinate echoed back by the API, if both parts are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter().map(|(k, v)| (k.to_lowercase(), lowercase_keys(v))).collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Hour buckets come without an offset (`2024-05-01T13:00`) and are taken as UTC.
fn parse_hour(s: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.and_utc())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)))
}
