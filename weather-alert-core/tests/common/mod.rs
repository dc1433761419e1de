#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{Level, subscriber::DefaultGuard};
use tracing_subscriber::fmt::MakeWriter;
use weather_alert_core::{Console, Notifier, OpenMeteoClient, Settings};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Console fed from a fixed script. Once the script runs out, reads wait
/// forever, like a user who stopped typing.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: Mutex<VecDeque<String>>,
    logs: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn with_inputs(inputs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inputs: Mutex::new(inputs.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        })
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.logs().iter().filter(|line| line.contains(needle)).count()
    }

    /// Poll until a log line contains `needle`.
    pub async fn wait_for(&self, needle: &str) -> bool {
        for _ in 0..500 {
            if self.count(needle) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn log_line(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }

    fn prompt_echo(&self, text: &str) {
        self.prompts.lock().unwrap().push(text.to_string());
    }

    async fn read_line(&self) -> String {
        let next = self.inputs.lock().unwrap().pop_front();
        match next {
            Some(line) => line.trim().to_string(),
            None => std::future::pending().await,
        }
    }
}

/// Log records formatted into memory, one record per line.
///
/// The subscriber is the thread's default, so tests using it must run on the
/// current-thread runtime (the `#[tokio::test]` default).
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(Level::INFO)
            .without_time()
            .with_target(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
    }

    /// Whether a record at `level` contains `needle`.
    pub fn has(&self, level: Level, needle: &str) -> bool {
        let level = level.to_string();
        self.lines()
            .iter()
            .any(|line| line.trim_start().starts_with(&level) && line.contains(needle))
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub const LATITUDE: f64 = 40.7128;
pub const LONGITUDE: f64 = 24.006;

pub fn settings(server: &MockServer) -> Settings {
    Settings {
        api_url: format!("{}/v1/", server.uri()),
        forecast_days: 2,
        warning_threshold_percent: 20.0,
        warning_hours: 5,
        warning_frequency_secs: 60,
        latitude: LATITUDE,
        longitude: LONGITUDE,
        ..Settings::default()
    }
}

pub fn notifier(settings: &Settings, console: Arc<ScriptedConsole>) -> Arc<Notifier> {
    let client = OpenMeteoClient::from_settings(settings).expect("client");
    Arc::new(Notifier::new(Arc::new(client), console, settings.warning_policy()))
}

/// Single-hour body in the API's format, hour bucket of `time`.
pub fn hourly_body(time: DateTime<Utc>, probability: f64) -> String {
    serde_json::json!({
        "latitude": LATITUDE,
        "longitude": LONGITUDE,
        "hourly": {
            "time": [time.format("%Y-%m-%dT%H:00").to_string()],
            "precipitation_probability": [probability],
        }
    })
    .to_string()
}

pub fn next_hour() -> DateTime<Utc> {
    Utc::now() + chrono::Duration::hours(1)
}

pub fn previous_hour() -> DateTime<Utc> {
    Utc::now() - chrono::Duration::hours(1)
}

pub async fn mount_forecast(server: &MockServer, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}
