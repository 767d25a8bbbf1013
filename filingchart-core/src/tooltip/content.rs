//! Tooltip content: one line per event on the tooltip's date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::TooltipConfig;
use crate::domain::{form_description, EventId, FilingEvent, FormCategory, Rgb};
use crate::markers::MarkerTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipLine {
    pub event_id: EventId,
    pub category: FormCategory,
    pub color: Rgb,
    pub form_label: String,
    pub description: String,
    pub date: NaiveDate,
    /// Headline or the "No summary available" fallback.
    pub headline: String,
    pub document_url: String,
}

impl TooltipLine {
    pub fn from_event(event: &FilingEvent) -> Self {
        let category = event.category();
        let description = if event.description.trim().is_empty() {
            form_description(&event.form_type).to_string()
        } else {
            event.description.clone()
        };
        Self {
            event_id: event.id,
            category,
            color: category.color(),
            form_label: event.form_type.clone(),
            description,
            date: event.filed_date(),
            headline: event.summary().to_string(),
            document_url: event.document_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub date: NaiveDate,
    pub lines: Vec<TooltipLine>,
}

impl TooltipContent {
    /// Content for the marker on `date`, in event input order.
    pub fn for_date(table: &MarkerTable, date: NaiveDate) -> Option<Self> {
        let events = table.events_on(date);
        if events.is_empty() {
            return None;
        }
        Some(Self {
            date,
            lines: events.iter().map(TooltipLine::from_event).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Natural (unclipped) height.
    pub fn height(&self, config: &TooltipConfig) -> f64 {
        2.0 * config.padding + self.lines.len() as f64 * config.entry_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_filed_at, EventKind, PriceBar, NO_SUMMARY};

    fn event(id: u64, form: &str, headline: Option<&str>) -> FilingEvent {
        FilingEvent {
            id: EventId(id),
            ticker: "LUNR".into(),
            company_name: "Intuitive Machines".into(),
            form_type: form.into(),
            description: String::new(),
            filed_at: parse_filed_at("2024-01-02T09:00:00Z").unwrap(),
            headline: headline.map(str::to_string),
            document_url: format!("https://www.sec.gov/doc/{id}"),
            kind: EventKind::Filing,
        }
    }

    fn table(events: &[FilingEvent]) -> MarkerTable {
        let bar = PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 0,
        };
        MarkerTable::resolve(&[bar], events)
    }

    #[test]
    fn lines_follow_event_order_with_fallback_headline() {
        let events = [event(1, "4", None), event(2, "10-K", Some("Annual results"))];
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let content = TooltipContent::for_date(&table(&events), date).unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content.lines[0].headline, NO_SUMMARY);
        assert_eq!(content.lines[0].color, FormCategory::InsiderTransaction.color());
        assert_eq!(content.lines[0].description, "Insider Trading");
        assert_eq!(content.lines[1].form_label, "10-K");
        assert_eq!(content.lines[1].headline, "Annual results");
    }

    #[test]
    fn no_content_for_unmarked_date() {
        let t = table(&[event(1, "8-K", None)]);
        assert!(TooltipContent::for_date(&t, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()).is_none());
    }

    #[test]
    fn height_counts_entries_and_padding() {
        let events = [event(1, "8-K", None), event(2, "8-K", None), event(3, "8-K", None)];
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let content = TooltipContent::for_date(&table(&events), date).unwrap();
        assert_eq!(content.height(&TooltipConfig::default()), 20.0 + 3.0 * 46.0);
    }
}
