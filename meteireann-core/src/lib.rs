//! Client library for Met Éireann's public forecast and weather warning APIs.
//!
//! This crate defines:
//! - Configuration handling (location, warning region, endpoints)
//! - The `WeatherProvider` abstraction and its HTTP implementation
//! - Parsing of the forecast XML and the warning JSON feed
//! - Selection of current, hourly and daily weather from a forecast
//!
//! It is used by `meteireann-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod warning;

pub use cache::WeatherCache;
pub use config::Config;
pub use error::{Error, Result};
pub use forecast::Forecast;
pub use model::{Coordinates, ForecastMode, Region, Warning, WarningLevel, WeatherReport};
pub use provider::{WeatherProvider, met_eireann::MetEireannProvider, provider_from_config};
pub use warning::active_warnings;
