//! Decides whether a forecast warrants a precipitation alert.

use chrono::{DateTime, Utc};

use crate::model::ForecastResponse;

/// Threshold and look-ahead used when scanning a forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarningPolicy {
    /// Inclusive lower bound, in percent.
    pub threshold_percent: f64,
    /// Length of the warning window in hours.
    pub hours: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertDecision {
    /// The response carried no hourly data.
    NoData,
    /// Every hour in the response lies in the past.
    NoFutureData,
    /// Nothing in the warning window reaches the threshold.
    Clear,
    /// First hour in the window reaching the threshold.
    Alert {
        index: usize,
        time: DateTime<Utc>,
        probability: f64,
    },
}

/// Scan the warning window that starts at the first hour not before `now`.
///
/// The earliest qualifying hour wins, not the wettest one.
pub fn evaluate(
    response: &ForecastResponse,
    now: DateTime<Utc>,
    policy: WarningPolicy,
) -> AlertDecision {
    let entries = match &response.hourly {
        Some(hourly) if !hourly.is_empty() => hourly.entries(),
        _ => return AlertDecision::NoData,
    };

    let Some(start) = entries.iter().position(|entry| entry.time >= now) else {
        return AlertDecision::NoFutureData;
    };

    let end = start.saturating_add(policy.hours).min(entries.len());

    entries[start..end]
        .iter()
        .enumerate()
        .find_map(|(offset, entry)| match entry.probability {
            Some(probability) if probability >= policy.threshold_percent => {
                Some(AlertDecision::Alert { index: start + offset, time: entry.time, probability })
            }
            _ => None,
        })
        .unwrap_or(AlertDecision::Clear)
}
