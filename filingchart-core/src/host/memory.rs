//! Headless chart engine.
//!
//! `MemoryEngine` keeps a [`ViewTransform`] over the loaded series and lets a
//! driver script pans, zooms and pointer input. The CLI uses it to compute
//! markers and tooltips without a display; tests use its journal to check
//! what the host asked of the engine.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use super::engine::{ChartEngine, ChartEvent, EngineError, EventQueue, FitCompletion, Subscription};
use crate::coords::{CoordinateMapper, Point, Rect, Size, ViewTransform};
use crate::domain::PriceBar;

/// One call the host made on the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(usize),
    Fit,
    ApplySize(Size),
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    Destroy,
}

/// Shared call log; clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct EngineJournal(Rc<RefCell<Vec<EngineCall>>>);

impl EngineJournal {
    pub fn record(&self, call: EngineCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct MemoryEngine {
    size: Size,
    bars: Vec<PriceBar>,
    view: Option<ViewTransform>,
    queue: EventQueue,
    min_spacing: f64,
    settles_on_fit: bool,
    fail_load: Option<String>,
    destroyed: bool,
    journal: EngineJournal,
}

impl MemoryEngine {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            bars: Vec::new(),
            view: None,
            queue: EventQueue::default(),
            min_spacing: 0.0,
            settles_on_fit: false,
            fail_load: None,
            destroyed: false,
            journal: EngineJournal::default(),
        }
    }

    /// Report `Settled` from `fit_content` instead of `Pending`.
    pub fn settles_on_fit(mut self, yes: bool) -> Self {
        self.settles_on_fit = yes;
        self
    }

    /// Make `load_series` fail with `message`.
    pub fn failing_load(mut self, message: impl Into<String>) -> Self {
        self.fail_load = Some(message.into());
        self
    }

    pub fn with_min_spacing(mut self, px: f64) -> Self {
        self.min_spacing = px;
        self
    }

    pub fn with_journal(mut self, journal: EngineJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn journal(&self) -> &EngineJournal {
        &self.journal
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn view(&self) -> Option<&ViewTransform> {
        self.view.as_ref()
    }

    pub fn pan(&mut self, bars: f64) {
        if let Some(view) = &mut self.view {
            view.pan(bars);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
    }

    pub fn zoom(&mut self, factor: f64) {
        if let Some(view) = &mut self.view {
            view.zoom(factor);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
    }

    /// Finish an asynchronous layout.
    pub fn settle(&mut self) {
        if !self.destroyed {
            self.queue.push(ChartEvent::LayoutSettled);
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        let date = self.date_at(point);
        if !self.destroyed {
            self.queue.push(ChartEvent::Hover { date, point });
        }
    }

    pub fn pointer_click(&mut self, point: Point) {
        let date = self.date_at(point);
        if !self.destroyed {
            self.queue.push(ChartEvent::Click { date, point });
        }
    }

    /// Click at the bar on `date`, at mid-plot height.
    pub fn click_date(&mut self, date: NaiveDate) {
        let point = self.point_for(date);
        self.pointer_click(point);
    }

    pub fn hover_date(&mut self, date: NaiveDate) {
        let point = self.point_for(date);
        self.pointer_move(point);
    }

    fn point_for(&self, date: NaiveDate) -> Point {
        let y = self.size.height / 2.0;
        let x = self.date_to_x(date).unwrap_or(-1.0);
        Point::new(x, y)
    }

    fn date_at(&self, point: Point) -> Option<NaiveDate> {
        let view = self.view.as_ref()?;
        if !view.plot().contains(point) {
            return None;
        }
        view.date_at_x(point.x)
    }
}

impl CoordinateMapper for MemoryEngine {
    fn date_to_x(&self, date: NaiveDate) -> Option<f64> {
        self.view.as_ref()?.date_to_x(date)
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        self.view.as_ref()?.price_to_y(price)
    }
}

impl ChartEngine for MemoryEngine {
    fn load_series(&mut self, bars: &[PriceBar]) -> Result<(), EngineError> {
        self.journal.record(EngineCall::Load(bars.len()));
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        if let Some(message) = &self.fail_load {
            return Err(EngineError::Load(message.clone()));
        }
        self.bars = bars.to_vec();
        self.view = Some(ViewTransform::new(&self.bars, Rect::from_size(self.size)));
        Ok(())
    }

    fn fit_content(&mut self) -> FitCompletion {
        self.journal.record(EngineCall::Fit);
        if let Some(view) = &mut self.view {
            view.fit(self.min_spacing);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
        if self.settles_on_fit {
            FitCompletion::Settled
        } else {
            FitCompletion::Pending
        }
    }

    fn apply_size(&mut self, size: Size) {
        self.journal.record(EngineCall::ApplySize(size));
        self.size = size;
        if let Some(view) = &mut self.view {
            view.set_plot(Rect::from_size(size));
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn subscribe(&mut self, kind: Subscription) {
        self.journal.record(EngineCall::Subscribe(kind));
        if !self.destroyed {
            self.queue.subscribe(kind);
        }
    }

    fn unsubscribe(&mut self, kind: Subscription) {
        self.journal.record(EngineCall::Unsubscribe(kind));
        self.queue.unsubscribe(kind);
    }

    fn poll_event(&mut self) -> Option<ChartEvent> {
        self.queue.pop()
    }

    fn destroy(&mut self) {
        self.journal.record(EngineCall::Destroy);
        self.destroyed = true;
        self.queue.clear();
        self.view = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        (0..n)
            .map(|i| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: 10.0,
                high: 12.0,
                low: 9.0,
                close: 11.0,
                volume: 1_000,
            })
            .collect()
    }

    #[test]
    fn unresolvable_before_load_and_after_destroy() {
        let mut e = MemoryEngine::new(Size::new(100.0, 50.0));
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(e.date_to_x(first), None);
        e.load_series(&bars(10)).unwrap();
        e.fit_content();
        assert!(e.date_to_x(first).is_some());
        e.destroy();
        assert_eq!(e.date_to_x(first), None);
        assert!(matches!(e.load_series(&bars(1)), Err(EngineError::Destroyed)));
    }

    #[test]
    fn events_require_subscription() {
        let mut e = MemoryEngine::new(Size::new(100.0, 50.0));
        e.load_series(&bars(10)).unwrap();
        e.pan(-1.0);
        assert_eq!(e.poll_event(), None);
        e.subscribe(Subscription::VisibleRange);
        e.pan(-1.0);
        assert_eq!(e.poll_event(), Some(ChartEvent::VisibleRangeChanged));
    }

    #[test]
    fn click_reports_date_under_pointer() {
        let mut e = MemoryEngine::new(Size::new(100.0, 50.0));
        e.load_series(&bars(10)).unwrap();
        e.fit_content();
        e.subscribe(Subscription::Click);
        let date = NaiveDate::from_ymd_opt(2024, 2, 4).unwrap();
        e.click_date(date);
        match e.poll_event() {
            Some(ChartEvent::Click { date: got, .. }) => assert_eq!(got, Some(date)),
            other => panic!("expected click, got {other:?}"),
        }
        e.pointer_click(Point::new(500.0, 10.0));
        assert!(matches!(
            e.poll_event(),
            Some(ChartEvent::Click { date: None, .. })
        ));
    }

    #[test]
    fn journal_is_shared_between_clones() {
        let journal = EngineJournal::default();
        let mut e = MemoryEngine::new(Size::new(10.0, 10.0)).with_journal(journal.clone());
        e.subscribe(Subscription::Hover);
        e.destroy();
        assert_eq!(
            journal.calls(),
            vec![EngineCall::Subscribe(Subscription::Hover), EngineCall::Destroy]
        );
    }

    #[test]
    fn failing_load_reports_message() {
        let mut e = MemoryEngine::new(Size::new(10.0, 10.0)).failing_load("bad series");
        let err = e.load_series(&bars(3)).unwrap_err();
        assert_eq!(err.to_string(), "series load failed: bad series");
    }
}
