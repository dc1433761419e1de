use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::{
    config::Settings,
    error::FetchError,
    model::{Coordinate, ForecastResponse},
};

use super::ForecastSource;

/// Client for an Open-Meteo compatible `forecast` endpoint.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    forecast_days: u32,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, forecast_days: u32, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build().map_err(FetchError::Client)?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { base_url, forecast_days, http })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(&settings.api_url, settings.forecast_days, settings.request_timeout())
    }

    pub fn forecast_url(&self) -> String {
        format!("{}forecast", self.base_url)
    }

    /// `f64`'s `Display` never uses a locale-specific decimal separator.
    fn query(&self, at: Coordinate) -> [(&'static str, String); 4] {
        [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("hourly", "precipitation_probability".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch_precipitation(&self, at: Coordinate) -> Result<ForecastResponse, FetchError> {
        debug!(
            latitude = at.latitude,
            longitude = at.longitude,
            "requesting precipitation forecast"
        );

        let res = self
            .http
            .get(self.forecast_url())
            .query(&self.query(at))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        // The body may still describe the problem, so it is parsed regardless.
        if !status.is_success() {
            error!(%status, body = %truncate_body(&body), "forecast request failed");
        }

        Ok(ForecastResponse::from_json(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> OpenMeteoClient {
        OpenMeteoClient::new(base, 2, Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(client("https://test.com/v1").forecast_url(), "https://test.com/v1/forecast");
        assert_eq!(client("https://test.com/v1/").forecast_url(), "https://test.com/v1/forecast");
    }

    #[test]
    fn query_uses_invariant_decimals() {
        let query = client("https://test.com/v1/").query(Coordinate::new(40.7128, -24.5));

        assert_eq!(query[0], ("latitude", "40.7128".to_string()));
        assert_eq!(query[1], ("longitude", "-24.5".to_string()));
        assert_eq!(query[2], ("hourly", "precipitation_probability".to_string()));
        assert_eq!(query[3], ("forecast_days", "2".to_string()));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
