use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{model::Coordinate, notifier::Notifier};

/// Checks the default location on a fixed interval until cancelled.
pub struct PeriodicLoop {
    notifier: Arc<Notifier>,
    coordinate: Coordinate,
    interval: Duration,
    token: CancellationToken,
}

impl PeriodicLoop {
    pub fn new(
        notifier: Arc<Notifier>,
        coordinate: Coordinate,
        interval: Duration,
        token: CancellationToken,
    ) -> Self {
        Self { notifier, coordinate, interval, token }
    }

    pub async fn run(self) {
        info!(
            coordinate = %self.coordinate,
            interval_secs = self.interval.as_secs(),
            "periodic check started"
        );

        while !self.token.is_cancelled() {
            self.notifier.console().log_line("[WEATHER UPDATE] Checking precipitation...");
            self.notifier.notify(self.coordinate).await;

            tokio::select! {
                _ = self.token.cancelled() => {
                    warn!("periodic check cancelled while waiting for the next run");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("periodic check stopped");
    }
}
