use chrono::{DateTime, TimeZone, Utc};

use crate::{error::Result, model::Warning};

/// Parse the warning feed, a JSON array that is empty while no warning is in
/// force.
pub fn parse_warnings(json: &str) -> Result<Vec<Warning>> {
    let warnings: Vec<Warning> = serde_json::from_str(json)?;
    tracing::debug!(warnings = warnings.len(), "parsed warning feed");
    Ok(warnings)
}

impl Warning {
    /// `onset <= now < expiry`. A missing bound does not restrict.
    pub fn is_active_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let now = now.with_timezone(&Utc);
        let started = self.onset.is_none_or(|onset| onset.with_timezone(&Utc) <= now);
        let not_expired = self.expiry.is_none_or(|expiry| now < expiry.with_timezone(&Utc));
        started && not_expired
    }

    pub fn covers_region(&self, code: &str) -> bool {
        self.regions.iter().any(|r| r.eq_ignore_ascii_case(code.trim()))
    }
}

/// Warnings in force at `now`, most severe first.
pub fn active_warnings<Tz: TimeZone>(warnings: &[Warning], now: &DateTime<Tz>) -> Vec<Warning> {
    let mut active: Vec<Warning> =
        warnings.iter().filter(|w| w.is_active_at(now)).cloned().collect();
    active.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.onset.cmp(&b.onset)));
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, model::WarningLevel};

    const FEED: &str = r#"[
      {
        "id": "2.49.0.0.372.0.IE.240310063000.EI_YW_WIND_1",
        "capId": "2.49.0.0.372.0.IE.240310063000.EI_YW_WIND_1",
        "type": "Wind",
        "severity": "Moderate",
        "certainty": "Likely",
        "level": "Yellow",
        "issued": "2024-03-10T06:30:00+00:00",
        "updated": "2024-03-10T06:30:00+00:00",
        "onset": "2024-03-10T12:00:00+00:00",
        "expiry": "2024-03-11T00:00:00+00:00",
        "headline": "Status Yellow - Wind warning for Donegal, Galway, Mayo",
        "description": "Southwest winds will reach mean speeds of 50 to 65km/h with gusts of 90 to 110km/h.",
        "regions": ["EI06", "EI10", "EI20"],
        "status": "Warning"
      },
      {
        "id": "2.49.0.0.372.0.IE.240310070000.EI_OW_RAIN_1",
        "capId": "2.49.0.0.372.0.IE.240310070000.EI_OW_RAIN_1",
        "type": "Rain",
        "severity": "Severe",
        "certainty": "Likely",
        "level": "Orange",
        "issued": "2024-03-10T07:00:00+00:00",
        "onset": "2024-03-10T15:00:00+00:00",
        "expiry": "2024-03-10T21:00:00+00:00",
        "headline": "Status Orange - Rainfall warning for Kerry",
        "description": "Heavy and persistent rain.",
        "regions": ["EI11"],
        "status": "Warning"
      },
      {
        "id": "EI_YW_ICE_1",
        "type": "Low Temperature/Ice",
        "level": "Yellow",
        "onset": "2024-03-09T18:00:00+00:00",
        "expiry": "2024-03-10T09:00:00+00:00",
        "headline": "Status Yellow - Low Temperature/Ice warning for Ireland",
        "regions": []
      }
    ]"#;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).expect("valid timestamp").with_timezone(&Utc)
    }

    #[test]
    fn parses_feed_with_missing_fields() {
        let warnings = parse_warnings(FEED).expect("feed should parse");
        assert_eq!(warnings.len(), 3);

        let wind = &warnings[0];
        assert_eq!(wind.warning_type, "Wind");
        assert_eq!(wind.level, WarningLevel::Yellow);
        assert_eq!(wind.regions, vec!["EI06", "EI10", "EI20"]);
        assert_eq!(wind.onset.map(|t| t.with_timezone(&Utc)), Some(at("2024-03-10T12:00:00Z")));

        let ice = &warnings[2];
        assert_eq!(ice.cap_id, "");
        assert_eq!(ice.updated, None);
        assert!(ice.description.is_empty());
    }

    #[test]
    fn empty_feed_is_no_warnings() {
        assert!(parse_warnings("[]").expect("should parse").is_empty());
    }

    #[test]
    fn invalid_feed_is_an_error() {
        let err = parse_warnings("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn activity_window_is_half_open() {
        let warnings = parse_warnings(FEED).expect("feed should parse");
        let wind = &warnings[0];

        assert!(!wind.is_active_at(&at("2024-03-10T11:59:59Z")));
        assert!(wind.is_active_at(&at("2024-03-10T12:00:00Z")));
        assert!(!wind.is_active_at(&at("2024-03-11T00:00:00Z")));

        let open_ended = Warning { onset: None, expiry: None, ..wind.clone() };
        assert!(open_ended.is_active_at(&at("2030-01-01T00:00:00Z")));
    }

    #[test]
    fn active_warnings_sorted_by_severity() {
        let warnings = parse_warnings(FEED).expect("feed should parse");

        let active = active_warnings(&warnings, &at("2024-03-10T16:00:00Z"));
        let types: Vec<&str> = active.iter().map(|w| w.warning_type.as_str()).collect();
        assert_eq!(types, vec!["Rain", "Wind"]);

        assert!(active_warnings(&warnings, &at("2024-03-11T06:00:00Z")).is_empty());
    }

    #[test]
    fn unrecognised_level_sorts_after_known_levels() {
        let feed = r#"[
          {"type": "Marine", "level": "Purple"},
          {"type": "Wind", "level": "Yellow"},
          {"type": "Rain", "level": "Red"}
        ]"#;
        let warnings = parse_warnings(feed).expect("feed should parse");
        assert_eq!(warnings[0].level, WarningLevel::Unknown);

        let active = active_warnings(&warnings, &at("2024-03-10T16:00:00Z"));
        let types: Vec<&str> = active.iter().map(|w| w.warning_type.as_str()).collect();
        assert_eq!(types, vec!["Rain", "Wind", "Marine"]);
    }

    #[test]
    fn region_membership_ignores_case() {
        let warnings = parse_warnings(FEED).expect("feed should parse");
        assert!(warnings[0].covers_region("ei10"));
        assert!(!warnings[0].covers_region("EI11"));
        assert!(!warnings[2].covers_region("IRELAND"));
    }
}
