//! Marker resolution: which dates get a marker and in which category.
//!
//! A date gets a marker when it has at least one event and a price bar to
//! anchor to. When several events share the date, the highest-ranked category
//! represents it (see [`FormCategory::rank`]). Events on dates without a bar
//! (weekends, holidays, dates outside the loaded period) are dropped.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{FilingEvent, FormCategory, PriceBar, Rgb};

/// One resolved marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub date: NaiveDate,
    pub category: FormCategory,
    /// High of the bar on `date`.
    pub price_anchor: f64,
}

impl MarkerEntry {
    pub fn color(&self) -> Rgb {
        self.category.color()
    }
}

/// Marker table for one (bars, events) pair.
///
/// Entries are sorted by date, one per date. The events behind each entry are
/// kept in input order for tooltip content.
#[derive(Debug, Clone, Default)]
pub struct MarkerTable {
    entries: Vec<MarkerEntry>,
    events: BTreeMap<NaiveDate, Vec<FilingEvent>>,
}

impl MarkerTable {
    pub fn resolve(bars: &[PriceBar], events: &[FilingEvent]) -> Self {
        // Later bars win on duplicate dates, matching the series sort.
        let highs: BTreeMap<NaiveDate, f64> = bars.iter().map(|b| (b.date, b.high)).collect();

        let mut by_date: BTreeMap<NaiveDate, Vec<FilingEvent>> = BTreeMap::new();
        for ev in events {
            by_date.entry(ev.filed_date()).or_default().push(ev.clone());
        }
        let grouped_dates = by_date.len();

        by_date.retain(|date, _| highs.contains_key(date));

        let entries: Vec<MarkerEntry> = by_date
            .iter()
            .filter_map(|(date, evs)| {
                let category = evs.iter().map(FilingEvent::category).max()?;
                Some(MarkerEntry {
                    date: *date,
                    category,
                    price_anchor: highs[date],
                })
            })
            .collect();

        debug!(
            events = events.len(),
            dates = grouped_dates,
            markers = entries.len(),
            "resolved marker table"
        );

        Self {
            entries,
            events: by_date,
        }
    }

    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&MarkerEntry> {
        self.entries
            .binary_search_by_key(&date, |e| e.date)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    /// Events behind the marker on `date`; empty if there is no marker.
    pub fn events_on(&self, date: NaiveDate) -> &[FilingEvent] {
        self.events.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total events represented by markers.
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, EventKind};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(d: &str, high: f64) -> PriceBar {
        PriceBar {
            date: date(d),
            open: high - 1.0,
            high,
            low: high - 2.0,
            close: high - 0.5,
            volume: 100,
        }
    }

    fn event(id: u64, filed: &str, form: &str) -> FilingEvent {
        FilingEvent {
            id: EventId(id),
            ticker: "ASTS".into(),
            company_name: "AST SpaceMobile".into(),
            form_type: form.into(),
            description: String::new(),
            filed_at: crate::domain::parse_filed_at(filed).unwrap(),
            headline: None,
            document_url: String::new(),
            kind: EventKind::Filing,
        }
    }

    #[test]
    fn single_event_on_trading_day() {
        let table = MarkerTable::resolve(
            &[bar("2024-01-02", 100.0)],
            &[event(1, "2024-01-02T10:00:00Z", "10-K")],
        );
        assert_eq!(table.len(), 1);
        let m = table.entries()[0];
        assert_eq!(m.date, date("2024-01-02"));
        assert_eq!(m.category, FormCategory::AnnualReport);
        assert_eq!(m.price_anchor, 100.0);
    }

    #[test]
    fn highest_priority_wins_collision() {
        let table = MarkerTable::resolve(
            &[bar("2024-01-02", 100.0)],
            &[
                event(1, "2024-01-02", "4"),
                event(2, "2024-01-02", "10-K"),
                event(3, "2024-01-02", "8-K"),
            ],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].category, FormCategory::AnnualReport);
        assert_eq!(table.events_on(date("2024-01-02")).len(), 3);
    }

    #[test]
    fn non_trading_day_produces_no_marker() {
        let table = MarkerTable::resolve(
            &[bar("2024-01-02", 100.0)],
            &[event(1, "2024-01-06", "8-K")],
        );
        assert!(table.is_empty());
        assert!(table.events_on(date("2024-01-06")).is_empty());
    }

    #[test]
    fn entries_sorted_by_date() {
        let table = MarkerTable::resolve(
            &[bar("2024-01-02", 1.0), bar("2024-01-03", 2.0), bar("2024-01-04", 3.0)],
            &[
                event(1, "2024-01-04", "8-K"),
                event(2, "2024-01-02", "4"),
                event(3, "2024-01-03", "S-1"),
            ],
        );
        let dates: Vec<NaiveDate> = table.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03"), date("2024-01-04")]);
        assert_eq!(table.get(date("2024-01-03")).unwrap().category, FormCategory::News);
    }

    #[test]
    fn duplicate_bar_date_anchors_to_later_bar() {
        let table = MarkerTable::resolve(
            &[bar("2024-01-02", 10.0), bar("2024-01-02", 12.0)],
            &[event(1, "2024-01-02", "8-K")],
        );
        assert_eq!(table.entries()[0].price_anchor, 12.0);
    }

    #[test]
    fn empty_inputs_give_empty_table() {
        assert!(MarkerTable::resolve(&[], &[]).is_empty());
        assert!(MarkerTable::resolve(&[bar("2024-01-02", 1.0)], &[]).is_empty());
        assert_eq!(MarkerTable::default().event_count(), 0);
    }
}
