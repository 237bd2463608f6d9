use crate::{Config, Forecast, Warning, error::Result, provider::met_eireann::MetEireannProvider};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod met_eireann;

/// Source of forecast documents and warning feeds.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self) -> Result<Forecast>;

    async fn fetch_warnings(&self) -> Result<Vec<Warning>>;
}

/// Construct the Met Éireann provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider =
        MetEireannProvider::from_config(config).context("Invalid forecast location")?;
    Ok(Box::new(provider))
}
