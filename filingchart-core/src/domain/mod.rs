//! Domain types: price bars, filing events, form categories.

pub mod bar;
pub mod event;
pub mod form;

use chrono::NaiveDate;
use thiserror::Error;

pub use bar::{sort_bars, PriceBar};
pub use event::{parse_filed_at, EventId, EventKind, FilingEvent, NO_SUMMARY};
pub use form::{form_description, legend, FormCategory, LegendEntry, Rgb};

/// Ticker symbol.
pub type Ticker = String;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid filing timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },
}
