//! Core library for the `weather-alert` CLI.
//!
//! This crate defines:
//! - Settings handling
//! - The forecast client and the precipitation evaluator
//! - The console gate shared by concurrent tasks
//! - The periodic and interactive check loops
//!
//! It is used by `weather-alert-cli`, but the loops can be driven by any
//! [`Console`] and [`ForecastSource`] implementation.

pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod evaluator;
pub mod forecast;
pub mod interactive;
pub mod model;
pub mod notifier;
pub mod periodic;

pub use app::Shutdown;
pub use config::Settings;
pub use console::{Console, LineReader, PlainConsole, TerminalConsole};
pub use error::{FetchError, InputError};
pub use evaluator::{AlertDecision, WarningPolicy, evaluate};
pub use forecast::{ForecastSource, OpenMeteoClient};
pub use interactive::{InteractiveLoop, LoopExit};
pub use model::{Coordinate, ForecastResponse, HourlyEntry, HourlyForecast};
pub use notifier::Notifier;
pub use periodic::PeriodicLoop;
