//! Parsing of the `locationforecast` XML document and selection of the
//! forecast slot that best matches a requested instant.
//!
//! The document is a flat list of `<time from=".." to="..">` elements. Point
//! entries (`from == to`) carry instantaneous values such as temperature and
//! wind; interval entries carry precipitation and the weather symbol.

use chrono::{DateTime, Days, Duration, NaiveTime, Offset, TimeZone, Timelike, Utc};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::{ForecastMode, WeatherReport},
};

/// How far from the requested instant an entry may be, in hours, before it is
/// ignored.
pub const DEFAULT_MAX_HOUR: i64 = 6;

const HOURLY_SLOTS: i64 = 24;
const DAILY_SLOTS: u64 = 5;
const MPS_TO_KMH: f64 = 3.6;

/// Measurements of one `<location>` element. Wind speeds are in km/h.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationData {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub dewpoint_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub fog: Option<f64>,
    pub cloudiness: Option<f64>,
    pub low_clouds: Option<f64>,
    pub medium_clouds: Option<f64>,
    pub high_clouds: Option<f64>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub location: LocationData,
}

/// A parsed forecast document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    entries: Vec<TimeEntry>,
}

impl Forecast {
    pub fn from_entries(entries: Vec<TimeEntry>) -> Self {
        Self { entries }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let raw: RawWeatherData = quick_xml::de::from_str(xml)?;

        let entries = raw
            .product
            .times
            .into_iter()
            .map(TimeEntry::try_from)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(entries = entries.len(), "parsed forecast document");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current weather, with the day's aggregates.
    pub fn current_weather(&self) -> Option<WeatherReport> {
        self.current_weather_at(Utc::now())
    }

    pub fn current_weather_at(&self, now: DateTime<Utc>) -> Option<WeatherReport> {
        self.weather_at(&now, DEFAULT_MAX_HOUR, ForecastMode::Daily)
    }

    /// The next 24 hours or the next five days, relative to now in `tz`.
    pub fn forecast<Tz: TimeZone>(&self, tz: &Tz, mode: ForecastMode) -> Vec<WeatherReport> {
        self.forecast_at(Utc::now(), tz, mode)
    }

    /// Hourly: `now` truncated to the hour, then each of the following 24
    /// hours. Daily: 12:00 local time on each of the following five days.
    /// Slots without matching data are left out.
    pub fn forecast_at<Tz: TimeZone>(
        &self,
        now: DateTime<Utc>,
        tz: &Tz,
        mode: ForecastMode,
    ) -> Vec<WeatherReport> {
        let local = now.with_timezone(tz);

        let slots: Vec<DateTime<Tz>> = match mode {
            ForecastMode::Hourly => {
                let start = local
                    .with_minute(0)
                    .and_then(|t| t.with_second(0))
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or_else(|| local.clone());
                (1..=HOURLY_SLOTS).map(|k| start.clone() + Duration::hours(k)).collect()
            }
            ForecastMode::Daily => {
                let today = local.date_naive();
                (1..=DAILY_SLOTS)
                    .filter_map(|k| {
                        let day = today.checked_add_days(Days::new(k))?;
                        let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0)?);
                        tz.from_local_datetime(&noon).earliest()
                    })
                    .collect()
            }
        };

        slots
            .iter()
            .filter_map(|slot| self.weather_at(slot, DEFAULT_MAX_HOUR, mode))
            .collect()
    }

    /// Select the weather for `time`.
    ///
    /// Entries that ended before `time` are never used. The remaining entries
    /// within `max_hour` hours are ranked by the summed distance of their
    /// bounds to `time`; each field is taken from the nearest entry that
    /// carries it. In daily mode temperature, precipitation and wind are
    /// aggregated over every remaining entry touching the calendar day of
    /// `time` in its own offset.
    pub fn weather_at<Tz: TimeZone>(
        &self,
        time: &DateTime<Tz>,
        max_hour: i64,
        mode: ForecastMode,
    ) -> Option<WeatherReport> {
        let at = time.with_timezone(&Utc);
        let tz = time.timezone();
        let day = time.date_naive();
        let max_dist = max_hour.saturating_mul(3600);

        let mut daily = DailyValues::default();
        let mut ranked: Vec<(i64, &TimeEntry)> = Vec::new();

        for entry in &self.entries {
            if at > entry.to {
                continue;
            }

            let from_day = entry.from.with_timezone(&tz).date_naive();
            let to_day = entry.to.with_timezone(&tz).date_naive();
            if from_day == day || to_day == day {
                daily.collect(&entry.location);
            }

            let dist =
                (entry.to - at).num_seconds().abs() + (entry.from - at).num_seconds().abs();
            if dist > max_dist {
                continue;
            }
            ranked.push((dist, entry));
        }

        if ranked.is_empty() {
            return None;
        }
        ranked.sort_by_key(|(dist, _)| *dist);
        let ranked: Vec<&TimeEntry> = ranked.into_iter().map(|(_, entry)| entry).collect();

        let mut report = WeatherReport {
            datetime: time.with_timezone(&time.offset().fix()),
            condition: nearest(&ranked, |l| l.symbol.clone()),
            pressure: nearest(&ranked, |l| l.pressure),
            humidity: nearest(&ranked, |l| l.humidity),
            wind_bearing: nearest(&ranked, |l| l.wind_direction),
            temperature: None,
            templow: None,
            precipitation: None,
            wind_speed: None,
            wind_gust: None,
            cloudiness: None,
        };

        match mode {
            ForecastMode::Hourly => {
                report.temperature = nearest(&ranked, |l| l.temperature);
                report.precipitation = nearest(&ranked, |l| l.precipitation);
                report.wind_speed = nearest(&ranked, |l| l.wind_speed);
                report.wind_gust = nearest(&ranked, |l| l.wind_gust);
                report.cloudiness = nearest(&ranked, |l| l.cloudiness);
            }
            ForecastMode::Daily => {
                report.temperature = max(&daily.temperatures);
                report.templow = daily.temperatures.iter().copied().reduce(f64::min);
                report.precipitation = (!daily.precipitation.is_empty())
                    .then(|| round1(daily.precipitation.iter().sum()));
                report.wind_speed = max(&daily.wind_speeds);
                report.wind_gust = max(&daily.wind_gusts);
            }
        }

        Some(report)
    }
}

#[derive(Debug, Default)]
struct DailyValues {
    temperatures: Vec<f64>,
    precipitation: Vec<f64>,
    wind_speeds: Vec<f64>,
    wind_gusts: Vec<f64>,
}

impl DailyValues {
    fn collect(&mut self, location: &LocationData) {
        self.temperatures.extend(location.temperature);
        self.precipitation.extend(location.precipitation);
        self.wind_speeds.extend(location.wind_speed);
        self.wind_gusts.extend(location.wind_gust);
    }
}

fn nearest<T>(ranked: &[&TimeEntry], pick: impl Fn(&LocationData) -> Option<T>) -> Option<T> {
    ranked.iter().find_map(|entry| pick(&entry.location))
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp { value: value.to_string(), source })
}

fn parse_number(raw: Option<&str>, scale: f64) -> Option<f64> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(round1(v * scale)),
        _ => {
            tracing::warn!(value = raw, "ignoring unparsable forecast value");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawWeatherData {
    product: RawProduct,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(rename = "time", default)]
    times: Vec<RawTime>,
}

#[derive(Debug, Deserialize)]
struct RawTime {
    #[serde(rename = "@from")]
    from: String,
    #[serde(rename = "@to")]
    to: String,
    #[serde(default)]
    location: RawLocation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLocation {
    temperature: Option<RawValue>,
    precipitation: Option<RawValue>,
    pressure: Option<RawValue>,
    humidity: Option<RawValue>,
    dewpoint_temperature: Option<RawValue>,
    wind_speed: Option<RawValue>,
    wind_gust: Option<RawValue>,
    wind_direction: Option<RawValue>,
    fog: Option<RawValue>,
    cloudiness: Option<RawValue>,
    low_clouds: Option<RawValue>,
    medium_clouds: Option<RawValue>,
    high_clouds: Option<RawValue>,
    symbol: Option<RawValue>,
}

/// Attributes of a measurement element. Each parameter uses one of them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawValue {
    #[serde(rename = "@value")]
    value: Option<String>,
    #[serde(rename = "@mps")]
    mps: Option<String>,
    #[serde(rename = "@deg")]
    deg: Option<String>,
    #[serde(rename = "@percent")]
    percent: Option<String>,
    #[serde(rename = "@id")]
    id: Option<String>,
}

fn value(raw: &Option<RawValue>) -> Option<f64> {
    parse_number(raw.as_ref()?.value.as_deref(), 1.0)
}

fn mps(raw: &Option<RawValue>) -> Option<f64> {
    parse_number(raw.as_ref()?.mps.as_deref(), MPS_TO_KMH)
}

fn deg(raw: &Option<RawValue>) -> Option<f64> {
    parse_number(raw.as_ref()?.deg.as_deref(), 1.0)
}

fn percent(raw: &Option<RawValue>) -> Option<f64> {
    parse_number(raw.as_ref()?.percent.as_deref(), 1.0)
}

impl From<RawLocation> for LocationData {
    fn from(raw: RawLocation) -> Self {
        Self {
            temperature: value(&raw.temperature),
            precipitation: value(&raw.precipitation),
            pressure: value(&raw.pressure),
            humidity: value(&raw.humidity),
            dewpoint_temperature: value(&raw.dewpoint_temperature),
            wind_speed: mps(&raw.wind_speed),
            wind_gust: mps(&raw.wind_gust),
            wind_direction: deg(&raw.wind_direction),
            fog: percent(&raw.fog),
            cloudiness: percent(&raw.cloudiness),
            low_clouds: percent(&raw.low_clouds),
            medium_clouds: percent(&raw.medium_clouds),
            high_clouds: percent(&raw.high_clouds),
            symbol: raw.symbol.and_then(|s| s.id),
        }
    }
}

impl TryFrom<RawTime> for TimeEntry {
    type Error = Error;

    fn try_from(raw: RawTime) -> Result<Self> {
        Ok(Self {
            from: parse_timestamp(&raw.from)?,
            to: parse_timestamp(&raw.to)?,
            location: raw.location.into(),
        })
    }
}
