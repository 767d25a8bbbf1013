//! Capability boundary to a chart engine.
//!
//! The host never inherits from or reaches into an engine; it drives one
//! through [`ChartEngine`] and reads its view through [`CoordinateMapper`].
//! Input and view changes come back as [`ChartEvent`]s the host polls.

use std::collections::{BTreeSet, VecDeque};

use chrono::NaiveDate;
use thiserror::Error;

use crate::coords::{CoordinateMapper, Point, Size};
use crate::domain::PriceBar;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("chart construction failed: {0}")]
    Construction(String),

    #[error("series load failed: {0}")]
    Load(String),

    #[error("chart instance already destroyed")]
    Destroyed,
}

/// Result of asking the engine to fit its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitCompletion {
    /// Layout is final; coordinates are valid now.
    Settled,
    /// Layout finishes later. The engine may or may not send `LayoutSettled`.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subscription {
    VisibleRange,
    Click,
    Hover,
}

impl Subscription {
    pub const ALL: [Subscription; 3] = [
        Subscription::VisibleRange,
        Subscription::Click,
        Subscription::Hover,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartEvent {
    /// Pan, zoom or fit changed the view transform.
    VisibleRangeChanged,
    /// Asynchronous layout after a fit has completed.
    LayoutSettled,
    /// Pointer moved; `date` is the nearest chart date under it.
    Hover {
        date: Option<NaiveDate>,
        point: Point,
    },
    /// Click or tap.
    Click {
        date: Option<NaiveDate>,
        point: Point,
    },
}

impl ChartEvent {
    /// Subscription gating this event. `LayoutSettled` is always delivered.
    pub fn subscription(&self) -> Option<Subscription> {
        match self {
            ChartEvent::VisibleRangeChanged => Some(Subscription::VisibleRange),
            ChartEvent::LayoutSettled => None,
            ChartEvent::Hover { .. } => Some(Subscription::Hover),
            ChartEvent::Click { .. } => Some(Subscription::Click),
        }
    }
}

/// A chart engine with one candlestick series.
pub trait ChartEngine: CoordinateMapper {
    /// Replace the series. Bars arrive sorted ascending by date.
    fn load_series(&mut self, bars: &[PriceBar]) -> Result<(), EngineError>;

    /// Fit the visible range to all bars.
    fn fit_content(&mut self) -> FitCompletion;

    fn apply_size(&mut self, size: Size);

    fn size(&self) -> Size;

    fn subscribe(&mut self, kind: Subscription);

    fn unsubscribe(&mut self, kind: Subscription);

    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<ChartEvent>;

    /// Release the chart. Subscriptions are dropped and no further events
    /// are produced.
    fn destroy(&mut self);
}

/// Subscription-gated event queue for engine implementations.
#[derive(Debug, Default)]
pub struct EventQueue {
    subscribed: BTreeSet<Subscription>,
    pending: VecDeque<ChartEvent>,
}

impl EventQueue {
    pub fn subscribe(&mut self, kind: Subscription) {
        self.subscribed.insert(kind);
    }

    /// Stop delivering `kind`, including events already queued.
    pub fn unsubscribe(&mut self, kind: Subscription) {
        self.subscribed.remove(&kind);
        self.pending.retain(|ev| ev.subscription() != Some(kind));
    }

    pub fn is_subscribed(&self, kind: Subscription) -> bool {
        self.subscribed.contains(&kind)
    }

    /// Queue `event` if someone listens for it. Returns true if queued.
    pub fn push(&mut self, event: ChartEvent) -> bool {
        let wanted = event
            .subscription()
            .map_or(true, |kind| self.subscribed.contains(&kind));
        if wanted {
            self.pending.push_back(event);
        }
        wanted
    }

    pub fn pop(&mut self) -> Option<ChartEvent> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.subscribed.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
