use chrono::{DateTime, TimeZone, Utc};

use crate::{
    error::Result,
    forecast::Forecast,
    model::{ForecastMode, Warning, WeatherReport},
    provider::WeatherProvider,
    warning::active_warnings,
};

/// Keeps the last successfully fetched forecast and warning feed.
///
/// A failed refresh leaves the previous data in place. Queries made before
/// the first successful refresh return nothing.
#[derive(Debug)]
pub struct WeatherCache {
    provider: Box<dyn WeatherProvider>,
    forecast: Option<Forecast>,
    warnings: Option<Vec<Warning>>,
    forecast_fetched_at: Option<DateTime<Utc>>,
    warnings_fetched_at: Option<DateTime<Utc>>,
}

impl WeatherCache {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            forecast: None,
            warnings: None,
            forecast_fetched_at: None,
            warnings_fetched_at: None,
        }
    }

    pub async fn refresh_forecast(&mut self) -> Result<()> {
        let forecast = self.provider.fetch_forecast().await?;
        self.forecast = Some(forecast);
        self.forecast_fetched_at = Some(Utc::now());
        Ok(())
    }

    pub async fn refresh_warnings(&mut self) -> Result<()> {
        let warnings = self.provider.fetch_warnings().await?;
        self.warnings = Some(warnings);
        self.warnings_fetched_at = Some(Utc::now());
        Ok(())
    }

    pub fn forecast_data(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn forecast_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.forecast_fetched_at
    }

    pub fn warnings_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.warnings_fetched_at
    }

    pub fn current_weather(&self) -> Option<WeatherReport> {
        self.forecast.as_ref()?.current_weather()
    }

    pub fn forecast<Tz: TimeZone>(&self, tz: &Tz, mode: ForecastMode) -> Vec<WeatherReport> {
        self.forecast.as_ref().map(|f| f.forecast(tz, mode)).unwrap_or_default()
    }

    pub fn warnings(&self) -> &[Warning] {
        self.warnings.as_deref().unwrap_or_default()
    }

    pub fn active_warnings(&self) -> Vec<Warning> {
        active_warnings(self.warnings(), &Utc::now())
    }
}
