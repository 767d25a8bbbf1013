//! Price and event providers.
//!
//! Providers hand the host plain vectors; the host never fetches anything
//! itself. A ticker with no data is a valid empty result, not an error.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{FilingEvent, PriceBar};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("parse {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unknown lookback period '{0}' (expected 1mo, 3mo, 6mo, 1y, 2y or 5y)")]
    UnknownPeriod(String),
}

/// How far back the price series reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Lookback {
    pub const ALL: [Lookback; 6] = [
        Lookback::OneMonth,
        Lookback::ThreeMonths,
        Lookback::SixMonths,
        Lookback::OneYear,
        Lookback::TwoYears,
        Lookback::FiveYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
            Lookback::FiveYears => "5y",
        }
    }

    pub fn span(self) -> Duration {
        let days = match self {
            Lookback::OneMonth => 30,
            Lookback::ThreeMonths => 91,
            Lookback::SixMonths => 182,
            Lookback::OneYear => 365,
            Lookback::TwoYears => 730,
            Lookback::FiveYears => 1826,
        };
        Duration::days(days)
    }

    /// Keep the bars within the period ending at the latest bar.
    pub fn trim(self, mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
        let Some(latest) = bars.iter().map(|b| b.date).max() else {
            return bars;
        };
        let cutoff = latest - self.span();
        bars.retain(|b| b.date > cutoff);
        bars
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lookback::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| SourceError::UnknownPeriod(s.to_string()))
    }
}

pub trait PriceSource {
    /// Daily bars for `ticker` over `period`, any order.
    fn prices(&self, ticker: &str, period: Lookback) -> Result<Vec<PriceBar>, SourceError>;
}

pub trait EventSource {
    /// Filings and press releases for `ticker`, any order.
    fn events(&self, ticker: &str) -> Result<Vec<FilingEvent>, SourceError>;
}

/// Reads `<root>/<TICKER>/prices.json` (or `prices.csv`) and
/// `<root>/<TICKER>/events.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `ticker`'s files. Names match case-insensitively so
    /// `asts/` serves `ASTS`.
    fn ticker_dir(&self, ticker: &str) -> PathBuf {
        let ticker = ticker.trim();
        let found = std::fs::read_dir(&self.root).ok().and_then(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().is_dir())
                .find(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|name| name.eq_ignore_ascii_case(ticker))
                })
                .map(|e| e.path())
        });
        found.unwrap_or_else(|| self.root.join(ticker.to_uppercase()))
    }

    /// Tickers with a data directory, sorted.
    pub fn tickers(&self) -> Result<Vec<String>, SourceError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| SourceError::Io {
            path: self.root.display().to_string(),
            source,
        })?;
        let mut tickers: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_uppercase))
            .collect();
        tickers.sort();
        Ok(tickers)
    }
}

impl PriceSource for FileSource {
    fn prices(&self, ticker: &str, period: Lookback) -> Result<Vec<PriceBar>, SourceError> {
        let dir = self.ticker_dir(ticker);
        let json = dir.join("prices.json");
        let csv = dir.join("prices.csv");
        let bars = if json.exists() {
            read_json::<Vec<PriceBar>>(&json)?
        } else if csv.exists() {
            read_csv_bars(&csv)?
        } else {
            debug!(ticker, "no price file");
            return Ok(Vec::new());
        };
        Ok(period.trim(drop_invalid(ticker, bars)))
    }
}

impl EventSource for FileSource {
    fn events(&self, ticker: &str) -> Result<Vec<FilingEvent>, SourceError> {
        let path = self.ticker_dir(ticker).join("events.json");
        if !path.exists() {
            debug!(ticker, "no event file");
            return Ok(Vec::new());
        }
        read_json(&path)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SourceError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn read_csv_bars(path: &Path) -> Result<Vec<PriceBar>, SourceError> {
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<PriceBar>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

fn drop_invalid(ticker: &str, bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let before = bars.len();
    let kept: Vec<PriceBar> = bars
        .into_iter()
        .filter(|b| match b.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(ticker, error = %e, "skipping invalid bar");
                false
            }
        })
        .collect();
    if kept.len() != before {
        debug!(ticker, dropped = before - kept.len(), "invalid bars dropped");
    }
    kept
}

/// In-memory provider for tests and generated data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    prices: HashMap<String, Vec<PriceBar>>,
    events: HashMap<String, Vec<FilingEvent>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, bars: Vec<PriceBar>, events: Vec<FilingEvent>) {
        let key = ticker.to_uppercase();
        self.prices.insert(key.clone(), bars);
        self.events.insert(key, events);
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut t: Vec<String> = self.prices.keys().cloned().collect();
        t.sort();
        t
    }
}

impl PriceSource for MemorySource {
    fn prices(&self, ticker: &str, period: Lookback) -> Result<Vec<PriceBar>, SourceError> {
        let bars = self
            .prices
            .get(&ticker.to_uppercase())
            .cloned()
            .unwrap_or_default();
        Ok(period.trim(bars))
    }
}

impl EventSource for MemorySource {
    fn events(&self, ticker: &str) -> Result<Vec<FilingEvent>, SourceError> {
        Ok(self
            .events
            .get(&ticker.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(d: NaiveDate) -> PriceBar {
        PriceBar {
            date: d,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.5,
            volume: 100,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("filingchart-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lookback_parses_known_periods() {
        assert_eq!("1mo".parse::<Lookback>().unwrap(), Lookback::OneMonth);
        assert_eq!("5y".parse::<Lookback>().unwrap(), Lookback::FiveYears);
        assert_eq!(Lookback::default(), Lookback::OneYear);
        assert!(matches!(
            "10y".parse::<Lookback>(),
            Err(SourceError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn trim_is_relative_to_latest_bar() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let bars = vec![
            bar(end - Duration::days(40)),
            bar(end - Duration::days(10)),
            bar(end),
        ];
        assert_eq!(Lookback::OneMonth.trim(bars.clone()).len(), 2);
        assert_eq!(Lookback::OneYear.trim(bars).len(), 3);
    }

    #[test]
    fn missing_ticker_is_empty_not_error() {
        let src = FileSource::new(scratch_dir("missing"));
        assert!(src.prices("NOPE", Lookback::OneYear).unwrap().is_empty());
        assert!(src.events("NOPE").unwrap().is_empty());
    }

    #[test]
    fn reads_csv_prices_and_skips_invalid_rows() {
        let root = scratch_dir("csv");
        let dir = root.join("RKLB");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("prices.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-02,5.0,5.5,4.8,5.2,1000\n\
             2024-01-03,5.2,4.0,5.0,5.1,900\n",
        )
        .unwrap();
        let bars = FileSource::new(&root).prices("rklb", Lookback::OneYear).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].high, 5.5);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn reads_event_json_in_wire_format() {
        let root = scratch_dir("events");
        let dir = root.join("PLTR");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("events.json"),
            r#"[{"id": 1, "ticker": "PLTR", "company_name": "Palantir",
                 "form_type": "10-K", "form_type_description": "Annual Report",
                 "filed_date": "2024-02-20T16:05:00Z", "headline": "FY results",
                 "document_url": "https://www.sec.gov/a", "event_type": "filing"}]"#,
        )
        .unwrap();
        let src = FileSource::new(&root);
        let events = src.events("PLTR").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary(), "FY results");
        assert_eq!(src.tickers().unwrap(), vec!["PLTR".to_string()]);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn lowercase_directory_serves_listed_ticker() {
        let root = scratch_dir("lowercase");
        let dir = root.join("asts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("prices.csv"),
            "date,open,high,low,close,volume\n2024-01-02,5.0,5.5,4.8,5.2,1000\n",
        )
        .unwrap();
        let src = FileSource::new(&root);
        let tickers = src.tickers().unwrap();
        assert_eq!(tickers, vec!["ASTS".to_string()]);
        assert_eq!(src.prices(&tickers[0], Lookback::FiveYears).unwrap().len(), 1);
        assert_eq!(src.prices("asts", Lookback::FiveYears).unwrap().len(), 1);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let root = scratch_dir("bad");
        let dir = root.join("ASTS");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("events.json"), "{not json").unwrap();
        assert!(matches!(
            FileSource::new(&root).events("ASTS"),
            Err(SourceError::Json { .. })
        ));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn memory_source_is_case_insensitive() {
        let mut src = MemorySource::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        src.insert("asts", vec![bar(d)], vec![]);
        assert_eq!(src.prices("ASTS", Lookback::OneYear).unwrap().len(), 1);
        assert_eq!(src.tickers(), vec!["ASTS".to_string()]);
    }
}
