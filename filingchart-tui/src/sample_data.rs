//! Sample data generator for the TUI.
//!
//! Produces a deterministic in-memory library when no data directory is
//! given:
//! - Noisy daily bars per ticker (weekends skipped, seeded random walk)
//! - Quarterly and annual reports, 8-Ks, insider forms and press releases
//! - Same-day collisions so marker priority is visible
//! - One ticker with filings but no prices, for the unsupported-ticker notice

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use filingchart_core::domain::{EventId, EventKind, FilingEvent, PriceBar};
use filingchart_core::source::MemorySource;

struct SampleTicker {
    ticker: &'static str,
    company: &'static str,
    start_price: f64,
    volatility: f64,
    seed: u64,
}

const SAMPLES: [SampleTicker; 3] = [
    SampleTicker {
        ticker: "ASTS",
        company: "AST SpaceMobile, Inc.",
        start_price: 12.0,
        volatility: 0.045,
        seed: 42,
    },
    SampleTicker {
        ticker: "LUNR",
        company: "Intuitive Machines, Inc.",
        start_price: 6.5,
        volatility: 0.05,
        seed: 7,
    },
    SampleTicker {
        ticker: "RKLB",
        company: "Rocket Lab USA, Inc.",
        start_price: 5.0,
        volatility: 0.035,
        seed: 99,
    },
];

/// Ticker with filings on record but no price history.
pub const UNPRICED_TICKER: &str = "SPCE";

/// Trading days generated per ticker.
pub const SAMPLE_DAYS: usize = 260;

pub fn sample_source() -> MemorySource {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default();
    let mut source = MemorySource::new();
    let mut next_id = 1u64;
    for sample in &SAMPLES {
        let bars = build_bars(start, SAMPLE_DAYS, sample);
        let events = build_events(&bars, sample, &mut next_id);
        source.insert(sample.ticker, bars, events);
    }
    let events = vec![sample_event(
        &mut next_id,
        UNPRICED_TICKER,
        "Virgin Galactic Holdings, Inc.",
        "10-Q",
        start + Duration::days(120),
        Some("Quarterly results"),
        EventKind::Filing,
    )];
    source.insert(UNPRICED_TICKER, Vec::new(), events);
    source
}

fn build_bars(start: NaiveDate, days: usize, sample: &SampleTicker) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(sample.seed);
    let mut bars = Vec::with_capacity(days);
    let mut date = start;
    let mut close = sample.start_price;

    while bars.len() < days {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
            continue;
        }
        let open = close * (1.0 + rng.gen_range(-0.01..0.01));
        close = (open * (1.0 + rng.gen_range(-sample.volatility..sample.volatility))).max(0.5);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..sample.volatility / 2.0));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..sample.volatility / 2.0));
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: rng.gen_range(500_000..5_000_000),
        });
        date += Duration::days(1);
    }
    bars
}

fn build_events(bars: &[PriceBar], sample: &SampleTicker, next_id: &mut u64) -> Vec<FilingEvent> {
    let mut rng = StdRng::seed_from_u64(sample.seed.wrapping_mul(31));
    let mut events = Vec::new();
    let day = |i: usize| bars[i.min(bars.len() - 1)].date;

    // Periodic reports: 10-K first, then three 10-Qs.
    for (q, idx) in [40usize, 100, 160, 220].into_iter().enumerate() {
        let (form, headline) = if q == 0 {
            ("10-K", "Annual report for fiscal year 2023")
        } else {
            ("10-Q", "Quarterly report")
        };
        events.push(sample_event(
            next_id,
            sample.ticker,
            sample.company,
            form,
            day(idx),
            Some(headline),
            EventKind::Filing,
        ));
        // Insider filing on the same day as the report.
        events.push(sample_event(
            next_id,
            sample.ticker,
            sample.company,
            "4",
            day(idx),
            None,
            EventKind::Filing,
        ));
    }

    // Scattered 8-Ks, insider forms and press releases.
    for _ in 0..10 {
        let idx = rng.gen_range(0..bars.len());
        let (form, kind, headline) = match rng.gen_range(0..3) {
            0 => ("8-K", EventKind::Filing, Some("Entry into a material agreement")),
            1 => ("4", EventKind::Filing, None),
            _ => ("PR", EventKind::PressRelease, Some("Company announces launch update")),
        };
        events.push(sample_event(
            next_id,
            sample.ticker,
            sample.company,
            form,
            day(idx),
            headline,
            kind,
        ));
    }

    // A filing on a weekend never gets a marker.
    if let Some(saturday) = bars
        .iter()
        .map(|b| b.date + Duration::days(1))
        .find(|d| d.weekday() == Weekday::Sat)
    {
        events.push(sample_event(
            next_id,
            sample.ticker,
            sample.company,
            "8-K",
            saturday,
            Some("Filed outside market days"),
            EventKind::Filing,
        ));
    }
    events
}

fn sample_event(
    next_id: &mut u64,
    ticker: &str,
    company: &str,
    form: &str,
    date: NaiveDate,
    headline: Option<&str>,
    kind: EventKind,
) -> FilingEvent {
    let id = *next_id;
    *next_id += 1;
    FilingEvent {
        id: EventId(id),
        ticker: ticker.to_string(),
        company_name: company.to_string(),
        form_type: form.to_string(),
        description: String::new(),
        filed_at: date.and_hms_opt(16, 5, 0).unwrap_or_default(),
        headline: headline.map(str::to_string),
        document_url: format!("https://www.sec.gov/Archives/edgar/data/{ticker}/{id:06}.htm"),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filingchart_core::source::{EventSource, Lookback, PriceSource};
    use filingchart_core::MarkerTable;

    #[test]
    fn sample_source_is_deterministic() {
        let a = sample_source();
        let b = sample_source();
        assert_eq!(
            a.prices("ASTS", Lookback::FiveYears).unwrap(),
            b.prices("ASTS", Lookback::FiveYears).unwrap()
        );
        assert_eq!(a.events("ASTS").unwrap(), b.events("ASTS").unwrap());
    }

    #[test]
    fn bars_are_sane_weekdays() {
        let source = sample_source();
        let bars = source.prices("RKLB", Lookback::FiveYears).unwrap();
        assert_eq!(bars.len(), SAMPLE_DAYS);
        assert!(bars.iter().all(PriceBar::is_sane));
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn annual_report_wins_its_collision() {
        let source = sample_source();
        let bars = source.prices("LUNR", Lookback::FiveYears).unwrap();
        let events = source.events("LUNR").unwrap();
        let table = MarkerTable::resolve(&bars, &events);
        let entry = table.get(bars[40].date).unwrap();
        assert_eq!(
            entry.category,
            filingchart_core::domain::FormCategory::AnnualReport
        );
        // The weekend filing is dropped.
        assert!(table.event_count() < events.len());
    }

    #[test]
    fn unpriced_ticker_has_events_only() {
        let source = sample_source();
        assert!(source.tickers().contains(&UNPRICED_TICKER.to_string()));
        assert!(source
            .prices(UNPRICED_TICKER, Lookback::OneYear)
            .unwrap()
            .is_empty());
        assert_eq!(source.events(UNPRICED_TICKER).unwrap().len(), 1);
    }
}
