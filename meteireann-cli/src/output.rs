//! Human-friendly rendering of reports and warnings.

use meteireann_core::{ForecastMode, Warning, WeatherReport};

pub fn format_report(r: &WeatherReport, mode: ForecastMode) -> String {
    let when = match mode {
        ForecastMode::Daily => r.datetime.format("%a %d %b").to_string(),
        ForecastMode::Hourly => r.datetime.format("%a %H:%M").to_string(),
    };

    let mut parts = vec![when, r.condition.clone().unwrap_or_else(|| "Unknown".to_string())];

    match (r.temperature, r.templow) {
        (Some(high), Some(low)) => parts.push(format!("{high:.1}°C / {low:.1}°C")),
        (Some(t), None) => parts.push(format!("{t:.1}°C")),
        _ => {}
    }
    if let Some(p) = r.precipitation {
        parts.push(format!("rain {p:.1} mm"));
    }
    if let Some(speed) = r.wind_speed {
        let mut wind = format!("wind {speed:.1} km/h");
        if let Some(gust) = r.wind_gust {
            wind.push_str(&format!(" (gusts {gust:.1})"));
        }
        if let Some(bearing) = r.wind_bearing {
            wind.push_str(&format!(" from {}", compass(bearing)));
        }
        parts.push(wind);
    }
    if let Some(h) = r.humidity {
        parts.push(format!("humidity {h:.0}%"));
    }
    if let Some(p) = r.pressure {
        parts.push(format!("{p:.1} hPa"));
    }
    if let Some(c) = r.cloudiness {
        parts.push(format!("cloud {c:.0}%"));
    }

    parts.join("  ")
}

pub fn format_warning(w: &Warning) -> String {
    let mut out = format!("[{}] {}", w.level, w.headline);

    match (w.onset, w.expiry) {
        (Some(onset), Some(expiry)) => out.push_str(&format!(
            "\n  valid {} until {}",
            onset.format("%a %d %b %H:%M"),
            expiry.format("%a %d %b %H:%M")
        )),
        (Some(onset), None) => {
            out.push_str(&format!("\n  from {}", onset.format("%a %d %b %H:%M")));
        }
        _ => {}
    }
    if !w.description.is_empty() {
        out.push_str(&format!("\n  {}", w.description.trim()));
    }

    out
}

fn compass(bearing: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((bearing.rem_euclid(360.0) + 22.5) / 45.0) as usize % POINTS.len();
    POINTS[idx]
}
