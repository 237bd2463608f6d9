use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Text};
use meteireann_core::{
    Config, Coordinates, ForecastMode, Region, WeatherCache, provider_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteireann", version, about = "Met Éireann forecast and weather warnings")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests and parsing at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Per-invocation replacements for values from the config file.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Latitude in decimal degrees.
    #[arg(long = "lat", global = true, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long = "long", global = true, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Altitude in metres.
    #[arg(long = "alt", global = true, allow_negative_numbers = true)]
    pub altitude: Option<i32>,

    /// Warning region, e.g. IRELAND or EI07.
    #[arg(long, global = true)]
    pub region: Option<Region>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        let base = config.location();
        let location = Coordinates {
            latitude: self.latitude.unwrap_or(base.latitude),
            longitude: self.longitude.unwrap_or(base.longitude),
            altitude: self.altitude.unwrap_or(base.altitude),
        };
        if location != base {
            config.set_location(location)?;
        }

        if let Some(region) = &self.region {
            config.set_region(region.clone());
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the forecast location and warning region interactively.
    Configure,

    /// Show the current weather.
    Current,

    /// Show the forecast for the next five days, or the next 24 hours.
    Forecast {
        /// Hourly forecast instead of daily.
        #[arg(long)]
        hourly: bool,
    },

    /// Show weather warnings in force.
    Warnings {
        /// Include warnings that are not in force yet or have expired.
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Current => {
                self.overrides.apply(&mut config)?;
                let mut cache = WeatherCache::new(provider_from_config(&config)?);
                cache.refresh_forecast().await.context("Failed to fetch forecast")?;

                let report = cache.current_weather();
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    match report {
                        Some(r) => println!("{}", output::format_report(&r, ForecastMode::Daily)),
                        None => println!("No forecast data for the current time."),
                    }
                }
                Ok(())
            }
            Command::Forecast { hourly } => {
                self.overrides.apply(&mut config)?;
                let mut cache = WeatherCache::new(provider_from_config(&config)?);
                cache.refresh_forecast().await.context("Failed to fetch forecast")?;

                let mode = if hourly {
                    ForecastMode::Hourly
                } else {
                    ForecastMode::Daily
                };
                let reports = cache.forecast(&Local, mode);
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                } else if reports.is_empty() {
                    println!("No forecast data available.");
                } else {
                    for r in &reports {
                        println!("{}", output::format_report(r, mode));
                    }
                }
                Ok(())
            }
            Command::Warnings { all } => {
                self.overrides.apply(&mut config)?;
                let mut cache = WeatherCache::new(provider_from_config(&config)?);
                cache.refresh_warnings().await.context("Failed to fetch warnings")?;

                let warnings = if all {
                    cache.warnings().to_vec()
                } else {
                    cache.active_warnings()
                };
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&warnings)?);
                } else if warnings.is_empty() {
                    println!("No warnings for {}.", config.region());
                } else {
                    for w in &warnings {
                        println!("{}\n", output::format_warning(w));
                    }
                }
                Ok(())
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.location();

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.latitude)
        .with_error_message("Please enter a number, e.g. 53.35")
        .prompt()?;
    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.longitude)
        .with_error_message("Please enter a number, e.g. -6.26")
        .prompt()?;
    let altitude = CustomType::<i32>::new("Altitude (m):")
        .with_default(current.altitude)
        .with_error_message("Please enter a whole number of metres")
        .prompt()?;

    config.set_location(Coordinates::new(latitude, longitude, altitude)?)?;

    let region = Text::new("Warning region (IRELAND, or a code such as EI07):")
        .with_default(config.region().as_str())
        .prompt()?;
    config.set_region(region.parse()?);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
