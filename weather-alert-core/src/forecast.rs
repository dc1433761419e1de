use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::{Coordinate, ForecastResponse}};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Source of hourly precipitation forecasts.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_precipitation(&self, at: Coordinate) -> Result<ForecastResponse, FetchError>;
}
