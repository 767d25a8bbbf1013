//! Terminal chart engine: the candlestick chart drawn into a cell grid.
//!
//! One cell is one overlay "pixel". The container is the chart area of the
//! screen; the plot excludes the price axis on the left and the date axis on
//! the bottom row. Layout only settles once a frame has been drawn, so a
//! fresh chart reports its fit as pending until [`TerminalChart::frame_drawn`].

use chrono::NaiveDate;

use filingchart_core::coords::{CoordinateMapper, Point, Rect, Size, ViewTransform};
use filingchart_core::domain::PriceBar;
use filingchart_core::host::{
    ChartEngine, ChartEvent, EngineError, EventQueue, FitCompletion, Subscription,
};

/// Columns reserved on the left for price labels.
pub const AXIS_WIDTH: u16 = 8;

/// Rows reserved at the bottom for date labels.
pub const AXIS_HEIGHT: u16 = 1;

#[derive(Debug)]
pub struct TerminalChart {
    bars: Vec<PriceBar>,
    view: Option<ViewTransform>,
    size: Size,
    min_spacing: f64,
    queue: EventQueue,
    drawn: bool,
    destroyed: bool,
}

impl TerminalChart {
    /// Open a chart on a container of `size` cells.
    pub fn open(size: Size, min_spacing: f64) -> Result<Self, EngineError> {
        let plot = plot_for(size);
        if plot.width < 1.0 || plot.height < 2.0 {
            return Err(EngineError::Construction(format!(
                "terminal too small for a chart ({}x{} cells)",
                size.width, size.height
            )));
        }
        Ok(Self {
            bars: Vec::new(),
            view: None,
            size,
            min_spacing,
            queue: EventQueue::default(),
            drawn: false,
            destroyed: false,
        })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn view(&self) -> Option<&ViewTransform> {
        self.view.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Signal that a frame containing the chart has been drawn. The first
    /// call after construction settles the layout.
    pub fn frame_drawn(&mut self) -> bool {
        if self.drawn || self.destroyed {
            return false;
        }
        self.drawn = true;
        self.queue.push(ChartEvent::LayoutSettled);
        true
    }

    /// Shift the window by `bars` (positive = later dates).
    pub fn pan(&mut self, bars: f64) {
        if let Some(view) = &mut self.view {
            view.pan(bars);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
    }

    /// Scale the visible span; below 1 zooms in.
    pub fn zoom(&mut self, factor: f64) {
        if let Some(view) = &mut self.view {
            view.zoom(factor);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
    }

    /// Bars to move for one pan step: a tenth of the window, at least one.
    pub fn pan_step(&self) -> f64 {
        self.view
            .as_ref()
            .map_or(1.0, |v| (v.range().span() / 10.0).round().max(1.0))
    }

    /// Pointer moved to `point` (container cells).
    pub fn pointer_move(&mut self, point: Point) {
        if self.destroyed {
            return;
        }
        let date = self.date_under(point);
        self.queue.push(ChartEvent::Hover { date, point });
    }

    pub fn pointer_click(&mut self, point: Point) {
        if self.destroyed {
            return;
        }
        let date = self.date_under(point);
        self.queue.push(ChartEvent::Click { date, point });
    }

    fn date_under(&self, point: Point) -> Option<NaiveDate> {
        let view = self.view.as_ref()?;
        if !view.plot().contains(point) {
            return None;
        }
        view.date_at_x(point.x)
    }
}

/// Plot box inside a container of `size` cells.
pub fn plot_for(size: Size) -> Rect {
    let left = f64::from(AXIS_WIDTH);
    Rect::new(
        left,
        0.0,
        (size.width - left).max(0.0),
        (size.height - f64::from(AXIS_HEIGHT)).max(0.0),
    )
}

impl CoordinateMapper for TerminalChart {
    fn date_to_x(&self, date: NaiveDate) -> Option<f64> {
        self.view.as_ref()?.date_to_x(date)
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        self.view.as_ref()?.price_to_y(price)
    }
}

impl ChartEngine for TerminalChart {
    fn load_series(&mut self, bars: &[PriceBar]) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        if bars.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(EngineError::Load("bars must be in ascending date order".into()));
        }
        self.bars = bars.to_vec();
        self.view = Some(ViewTransform::new(&self.bars, plot_for(self.size)));
        Ok(())
    }

    fn fit_content(&mut self) -> FitCompletion {
        if let Some(view) = &mut self.view {
            view.fit(self.min_spacing);
            view.autoscale(&self.bars);
            self.queue.push(ChartEvent::VisibleRangeChanged);
        }
        if self.drawn {
            FitCompletion::Settled
        } else {
            FitCompletion::Pending
        }
    }

    fn apply_size(&mut self, size: Size) {
        self.size = size;
        if let Some(view) = &mut self.view {
            view.set_plot(plot_for(size));
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn subscribe(&mut self, kind: Subscription) {
        if !self.destroyed {
            self.queue.subscribe(kind);
        }
    }

    fn unsubscribe(&mut self, kind: Subscription) {
        self.queue.unsubscribe(kind);
    }

    fn poll_event(&mut self) -> Option<ChartEvent> {
        self.queue.pop()
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.queue.clear();
        self.view = None;
        self.bars.clear();
    }
}
