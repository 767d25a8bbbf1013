//! Load price bars and filing events for the TUI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use filingchart_core::source::{EventSource, FileSource, Lookback, PriceSource};
use filingchart_core::ChartInputs;

use crate::sample_data;

/// Where the TUI gets its data from.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Directory of `<TICKER>/prices.json|csv` and `<TICKER>/events.json`.
    /// `None` uses the generated sample library.
    pub data_dir: Option<PathBuf>,
    pub lookback: Lookback,
    /// Restrict to these tickers (any case). Empty loads everything found.
    pub tickers: Vec<String>,
}

impl LoadConfig {
    pub fn sample() -> Self {
        Self {
            data_dir: None,
            lookback: Lookback::OneYear,
            tickers: Vec::new(),
        }
    }
}

/// Chart inputs for every ticker, in display order. Each entry is loaded once
/// so the host can tell an unchanged ticker from a reload.
pub fn load_library(config: &LoadConfig) -> Result<Vec<ChartInputs>> {
    match &config.data_dir {
        Some(dir) => {
            let source = FileSource::new(dir);
            let found = source
                .tickers()
                .with_context(|| format!("Failed to list tickers in {}", dir.display()))?;
            let tickers = select(found, &config.tickers);
            info!(dir = %dir.display(), tickers = tickers.len(), "loading data directory");
            collect(&source, &tickers, config.lookback)
        }
        None => {
            let source = sample_data::sample_source();
            let tickers = select(source.tickers(), &config.tickers);
            info!(tickers = tickers.len(), "using generated sample data");
            collect(&source, &tickers, config.lookback)
        }
    }
}

/// Requested tickers keep their order, even ones the source does not know;
/// those load empty and are reported as unsupported when shown.
fn select(found: Vec<String>, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return found;
    }
    requested.iter().map(|t| t.trim().to_uppercase()).collect()
}

fn collect<S>(source: &S, tickers: &[String], lookback: Lookback) -> Result<Vec<ChartInputs>>
where
    S: PriceSource + EventSource,
{
    let mut library = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = source
            .prices(ticker, lookback)
            .with_context(|| format!("Failed to load prices for {ticker}"))?;
        let events = source
            .events(ticker)
            .with_context(|| format!("Failed to load events for {ticker}"))?;
        if bars.is_empty() {
            warn!(%ticker, "no price data");
        }
        library.push(ChartInputs::new(ticker.as_str(), bars, events));
    }
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn sample_library_lists_every_ticker() {
        let library = load_library(&LoadConfig::sample()).unwrap();
        let tickers: Vec<&str> = library.iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["ASTS", "LUNR", "RKLB", "SPCE"]);
        assert!(library[0].bars.len() > 200);
        assert!(library[3].bars.is_empty());
    }

    #[test]
    fn requested_tickers_keep_order() {
        let config = LoadConfig {
            tickers: vec!["rklb".into(), "NOPE".into()],
            ..LoadConfig::sample()
        };
        let library = load_library(&config).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library[0].ticker, "RKLB");
        assert_eq!(library[1].ticker, "NOPE");
        assert!(library[1].bars.is_empty());
        assert!(library[1].events.is_empty());
    }

    #[test]
    fn lookback_trims_sample_bars() {
        let config = LoadConfig {
            lookback: Lookback::OneMonth,
            tickers: vec!["ASTS".into()],
            ..LoadConfig::sample()
        };
        let library = load_library(&config).unwrap();
        assert!(library[0].bars.len() < 25);
    }

    #[test]
    fn reads_data_directory() {
        let dir = std::env::temp_dir().join(format!("filingchart-tui-load-{}", std::process::id()));
        let ticker_dir = dir.join("ACME");
        fs::create_dir_all(&ticker_dir).unwrap();
        fs::write(
            ticker_dir.join("prices.csv"),
            "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,1.5,100\n2024-01-03,1.5,2.5,1,2,100\n",
        )
        .unwrap();
        fs::write(
            ticker_dir.join("events.json"),
            r#"[{"id": 1, "ticker": "ACME", "form_type": "10-K", "filed_at": "2024-01-03"}]"#,
        )
        .unwrap();

        let config = LoadConfig {
            data_dir: Some(dir.clone()),
            lookback: Lookback::FiveYears,
            tickers: Vec::new(),
        };
        let library = load_library(&config).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(library.len(), 1);
        assert_eq!(library[0].ticker, "ACME");
        assert_eq!(library[0].bars.len(), 2);
        assert_eq!(library[0].events.len(), 1);
    }
}
