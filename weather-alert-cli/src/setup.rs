use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, CustomUserError, validator::Validation};
use std::path::Path;
use weather_alert_core::Settings;

/// Ask for the values people usually change and write the settings file.
pub fn run(path: &Path) -> Result<()> {
    let current = if path.exists() {
        let overwrite = Confirm::new(&format!("{} already exists. Update it?", path.display()))
            .with_default(true)
            .prompt()?;
        if !overwrite {
            println!("Keeping existing settings.");
            return Ok(());
        }
        Settings::load_from(path)?
    } else {
        Settings::default()
    };

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.latitude)
        .with_error_message("Please type a decimal number, e.g. 52.52")
        .prompt()?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.longitude)
        .with_error_message("Please type a decimal number, e.g. 13.41")
        .prompt()?;

    let warning_threshold_percent =
        CustomType::<f64>::new("Alert at precipitation probability (%):")
            .with_default(current.warning_threshold_percent)
            .with_error_message("Please type a number")
            .with_validator(|v: &f64| -> Result<Validation, CustomUserError> {
                if (0.0..=100.0).contains(v) {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid("Must be between 0 and 100".into()))
                }
            })
            .prompt()?;

    let warning_hours = CustomType::<u32>::new("Hours to look ahead:")
        .with_default(current.warning_hours)
        .with_error_message("Please type a whole number")
        .prompt()?;

    let warning_frequency_secs = CustomType::<u64>::new("Seconds between checks:")
        .with_default(current.warning_frequency_secs)
        .with_error_message("Please type a whole number")
        .with_validator(|v: &u64| -> Result<Validation, CustomUserError> {
            if *v > 0 {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid("Must be greater than zero".into()))
            }
        })
        .prompt()?;

    let settings = Settings {
        latitude,
        longitude,
        warning_threshold_percent,
        warning_hours,
        warning_frequency_secs,
        ..current
    };
    settings.validate().context("Refusing to save invalid settings")?;
    settings.save_to(path)?;

    println!("Saved settings to {}", path.display());
    Ok(())
}
