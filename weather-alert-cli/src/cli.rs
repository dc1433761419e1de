use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use weather_alert_core::{
    Console, Coordinate, LineReader, Notifier, OpenMeteoClient, PlainConsole, Settings,
    TerminalConsole, app,
};

use crate::{logging, setup};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-alert", version, about = "Console alerts for upcoming precipitation")]
pub struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log file; overrides `log_file` from the settings.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the default location and accept commands (the default).
    Run {
        #[command(flatten)]
        location: LocationArgs,

        /// Seconds between periodic checks.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Check a location once and exit.
    Check {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Create or update the settings file interactively.
    Init,
}

#[derive(Debug, Default, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees; defaults to the configured one.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees; defaults to the configured one.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(lat) = self.lat {
            settings.latitude = lat;
        }
        if let Some(lon) = self.lon {
            settings.longitude = lon;
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli { config, log_file, command } = self;
        let command = command
            .unwrap_or(Command::Run { location: LocationArgs::default(), interval: None });

        match command {
            Command::Init => {
                let path = match config {
                    Some(path) => path,
                    None => Settings::config_file_path()?,
                };
                setup::run(&path)
            }
            Command::Check { location } => {
                let mut settings = load_settings(config.as_deref(), log_file)?;
                location.apply(&mut settings);
                settings.validate()?;
                logging::init(&settings.log_file_path()?)?;

                check_once(&settings).await
            }
            Command::Run { location, interval } => {
                let mut settings = load_settings(config.as_deref(), log_file)?;
                location.apply(&mut settings);
                if let Some(secs) = interval {
                    settings.warning_frequency_secs = secs;
                }
                settings.validate()?;
                logging::init(&settings.log_file_path()?)?;

                watch(Arc::new(settings)).await
            }
        }
    }
}

fn load_settings(config: Option<&Path>, log_file: Option<PathBuf>) -> Result<Settings> {
    let mut settings = Settings::load(config)?;
    if log_file.is_some() {
        settings.log_file = log_file;
    }
    Ok(settings)
}

/// Run both loops until `exit` or Ctrl-C.
async fn watch(settings: Arc<Settings>) -> Result<()> {
    let client = Arc::new(OpenMeteoClient::from_settings(&settings)?);
    let token = CancellationToken::new();

    tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                token.cancel();
            }
        }
    });

    info!(
        api = %settings.api_url,
        coordinate = %settings.default_coordinate(),
        "starting weather-alert"
    );

    let input = LineReader::stdin();
    let shutdown = if io::stdout().is_terminal() {
        let console =
            Arc::new(TerminalConsole::stdout(input).context("Failed to set up terminal")?);
        let notifier = Notifier::new(client, console.clone(), settings.warning_policy());

        let result = app::run(Arc::clone(&settings), Arc::new(notifier), token).await;
        if let Err(e) = console.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
        result?
    } else {
        let console = Arc::new(PlainConsole::stdout(input));
        let notifier = Notifier::new(client, console, settings.warning_policy());

        app::run(Arc::clone(&settings), Arc::new(notifier), token).await?
    };

    info!(?shutdown, "weather-alert stopped");
    Ok(())
}

/// One evaluate-and-report pass for the configured (or overridden) location.
async fn check_once(settings: &Settings) -> Result<()> {
    let client = OpenMeteoClient::from_settings(settings)?;
    let console = Arc::new(PlainConsole::stdout(LineReader::closed()));
    let notifier = Notifier::new(Arc::new(client), console.clone(), settings.warning_policy());

    let at: Coordinate = settings.default_coordinate();
    console.log_line(&format!("[CUSTOM UPDATE] Checking precipitation at {at}..."));

    if notifier.notify(at).await.is_none() {
        bail!("Precipitation check for {at} failed");
    }
    Ok(())
}
