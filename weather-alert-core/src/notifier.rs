use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    console::Console,
    evaluator::{AlertDecision, WarningPolicy, evaluate},
    forecast::ForecastSource,
    model::Coordinate,
};

/// Fetch, evaluate and report one precipitation check.
///
/// Shared by the periodic and the interactive loop. Failures are logged and
/// printed here and never reach the caller.
pub struct Notifier {
    source: Arc<dyn ForecastSource>,
    console: Arc<dyn Console>,
    policy: WarningPolicy,
}

impl Notifier {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        console: Arc<dyn Console>,
        policy: WarningPolicy,
    ) -> Self {
        Self { source, console, policy }
    }

    pub fn console(&self) -> &Arc<dyn Console> {
        &self.console
    }

    /// Returns the decision that was reported, or `None` when the forecast
    /// could not be fetched.
    pub async fn notify(&self, at: Coordinate) -> Option<AlertDecision> {
        let response = match self.source.fetch_precipitation(at).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    error = %e,
                    latitude = at.latitude,
                    longitude = at.longitude,
                    "precipitation check failed"
                );
                self.console.log_line(&format!("[ERROR] {e}"));
                return None;
            }
        };

        let decision = evaluate(&response, Utc::now(), self.policy);
        self.report(&decision);
        Some(decision)
    }

    fn report(&self, decision: &AlertDecision) {
        match decision {
            AlertDecision::NoData => {
                error!("No weather data found");
                self.console.log_line("No weather data found");
            }
            AlertDecision::NoFutureData => {
                error!("No future data");
                self.console.log_line("No future data");
            }
            AlertDecision::Clear => {
                let message =
                    format!("No precipitation warnings in the next {} hours", self.policy.hours);
                info!("{message}");
                self.console.log_line(&format!("[INFO] {message}"));
            }
            AlertDecision::Alert { time, probability, .. } => {
                let message = format!(
                    "Grab an umbrella on {}, precipitation probability: {probability} %",
                    local_time(*time)
                );
                info!("{message}");
                self.console.log_line(&format!("[ALERT] {message}"));
            }
        }
    }
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
