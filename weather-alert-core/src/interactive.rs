use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    console::Console,
    error::InputError,
    model::Coordinate,
    notifier::Notifier,
};

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The user asked to quit the whole application.
    Terminate,
    Cancelled,
}

/// Outcome of one prompt inside the `check` sequence.
enum Step<T> {
    Value(T),
    Invalid(InputError),
    Cancelled,
}

/// Reads commands from the console and runs checks on demand.
pub struct InteractiveLoop {
    notifier: Arc<Notifier>,
    token: CancellationToken,
}

impl InteractiveLoop {
    pub fn new(notifier: Arc<Notifier>, token: CancellationToken) -> Self {
        Self { notifier, token }
    }

    fn console(&self) -> &dyn Console {
        self.notifier.console().as_ref()
    }

    pub async fn run(self) -> LoopExit {
        self.console().print_help();

        while !self.token.is_cancelled() {
            self.console().prompt_echo("> ");
            let Some(input) = self.read().await else {
                return LoopExit::Cancelled;
            };

            match input.as_str() {
                "exit" => {
                    self.console().log_line("Exiting app...");
                    info!("exit requested from console");
                    return LoopExit::Terminate;
                }
                "help" => self.console().print_help(),
                "check" => self.check().await,
                "" if self.console().input_closed() => {
                    warn!("console input closed, waiting for shutdown");
                    self.token.cancelled().await;
                    return LoopExit::Cancelled;
                }
                // Unknown commands get no feedback on the console.
                other => debug!(command = other, "ignoring unrecognized command"),
            }
        }

        LoopExit::Cancelled
    }

    async fn check(&self) {
        let latitude = match self.prompt_number("> Enter Latitude: ", "Latitude").await {
            Step::Value(v) => v,
            Step::Invalid(e) => return self.reject(e),
            Step::Cancelled => return,
        };
        let longitude = match self.prompt_number("> Enter Longitude: ", "Longitude").await {
            Step::Value(v) => v,
            Step::Invalid(e) => return self.reject(e),
            Step::Cancelled => return,
        };

        self.console().log_line("[CUSTOM UPDATE] Checking custom location precipitation...");
        self.notifier.notify(Coordinate::new(latitude, longitude)).await;
    }

    async fn prompt_number(&self, prompt: &str, field: &'static str) -> Step<f64> {
        self.console().prompt_echo(prompt);
        match self.read().await {
            Some(input) => match Coordinate::parse_component(field, &input) {
                Ok(v) => Step::Value(v),
                Err(e) => Step::Invalid(e),
            },
            None => Step::Cancelled,
        }
    }

    fn reject(&self, e: InputError) {
        warn!(field = e.field, input = %e.input, "invalid coordinate input");
        self.console().log_line(&e.to_string());
    }

    /// `None` once the loop is cancelled while waiting for input.
    async fn read(&self) -> Option<String> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            line = self.console().read_line() => Some(line),
        }
    }
}
