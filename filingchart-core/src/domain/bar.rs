//! PriceBar: one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Daily OHLCV bar. One per trading day; immutable once supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic sanity check: high bounds the body from above, low from below.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_sane() {
            Ok(())
        } else {
            Err(DomainError::InvalidBar {
                date: self.date,
                reason: format!(
                    "o={} h={} l={} c={}",
                    self.open, self.high, self.low, self.close
                ),
            })
        }
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Sort bars ascending by date.
///
/// The sort is stable; when two bars share a date only the later one in input
/// order is kept, so the series never carries duplicate timestamps.
pub fn sort_bars(bars: &[PriceBar]) -> Vec<PriceBar> {
    let mut sorted = bars.to_vec();
    sorted.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(sorted.len());
    for bar in sorted {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
