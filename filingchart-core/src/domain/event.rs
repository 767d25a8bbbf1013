//! FilingEvent: a dated disclosure item shown as a chart marker.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::form::FormCategory;
use super::DomainError;

/// Headline shown when an event carries none.
pub const NO_SUMMARY: &str = "No summary available";

/// Event identifier assigned by the event provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the event came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Filing,
    PressRelease,
}

/// A filing or press release for one ticker.
///
/// Field aliases accept the dashboard API's wire names (`filed_date`,
/// `form_type_description`, `event_type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingEvent {
    pub id: EventId,
    pub ticker: String,
    #[serde(default)]
    pub company_name: String,
    pub form_type: String,
    #[serde(default, alias = "form_type_description")]
    pub description: String,
    #[serde(alias = "filed_date", with = "filed_at_format")]
    pub filed_at: NaiveDateTime,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub document_url: String,
    #[serde(default, alias = "event_type")]
    pub kind: EventKind,
}

impl FilingEvent {
    /// Calendar date of the filing as written (time of day dropped).
    pub fn filed_date(&self) -> NaiveDate {
        self.filed_at.date()
    }

    /// Display category; press releases are always news.
    pub fn category(&self) -> FormCategory {
        match self.kind {
            EventKind::PressRelease => FormCategory::News,
            EventKind::Filing => FormCategory::classify(&self.form_type),
        }
    }

    /// Headline, or the fallback text when missing or blank.
    pub fn summary(&self) -> &str {
        match self.headline.as_deref().map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => NO_SUMMARY,
        }
    }
}

/// Parse a filing timestamp.
///
/// Accepts RFC 3339 (`2024-01-02T10:00:00Z`, `2024-01-02T10:00:00-05:00`),
/// a naive datetime (`2024-01-02T10:00:00`, `2024-01-02 10:00:00`) or a plain
/// date. Offsets are not applied: the calendar date is the one written.
pub fn parse_filed_at(s: &str) -> Result<NaiveDateTime, DomainError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DomainError::InvalidTimestamp(s.to_string()))
}

mod filed_at_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_filed_at(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_json(filed: &str) -> String {
        format!(
            r#"{{"id": 7, "ticker": "ASTS", "company_name": "AST SpaceMobile",
                "form_type": "8-K", "form_type_description": "Current Report",
                "filed_date": "{filed}", "headline": null,
                "document_url": "https://www.sec.gov/x", "event_type": "filing"}}"#
        )
    }

    #[test]
    fn parses_wire_format_aliases() {
        let ev: FilingEvent = serde_json::from_str(&event_json("2024-01-02T10:00:00Z")).unwrap();
        assert_eq!(ev.id, EventId(7));
        assert_eq!(ev.description, "Current Report");
        assert_eq!(ev.filed_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(ev.kind, EventKind::Filing);
        assert_eq!(ev.category(), FormCategory::CurrentReport);
    }

    #[test]
    fn filed_date_keeps_written_date_despite_offset() {
        let dt = parse_filed_at("2024-01-02T23:30:00-05:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn accepts_plain_date_and_naive_datetime() {
        let d = parse_filed_at("2024-03-05").unwrap();
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let n = parse_filed_at("2024-03-05 16:01:02").unwrap();
        assert_eq!(n.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(matches!(
            parse_filed_at("yesterday"),
            Err(DomainError::InvalidTimestamp(_))
        ));
        assert!(serde_json::from_str::<FilingEvent>(&event_json("05/03/2024")).is_err());
    }

    #[test]
    fn summary_falls_back_when_blank() {
        let mut ev: FilingEvent = serde_json::from_str(&event_json("2024-01-02")).unwrap();
        assert_eq!(ev.summary(), NO_SUMMARY);
        ev.headline = Some("   ".into());
        assert_eq!(ev.summary(), NO_SUMMARY);
        ev.headline = Some("Signs launch contract".into());
        assert_eq!(ev.summary(), "Signs launch contract");
    }

    #[test]
    fn press_release_is_news_regardless_of_form() {
        let mut ev: FilingEvent = serde_json::from_str(&event_json("2024-01-02")).unwrap();
        ev.kind = EventKind::PressRelease;
        ev.form_type = "10-K".into();
        assert_eq!(ev.category(), FormCategory::News);
    }
}
