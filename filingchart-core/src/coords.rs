//! Coordinate mapping between chart data space and overlay pixels.
//!
//! [`CoordinateMapper`] is the narrow view of a chart engine the overlay
//! needs: a date maps to an x pixel, a price to a y pixel, either of which may
//! be unresolvable when it lies outside what is currently rendered.
//!
//! [`ViewTransform`] is a self-contained implementation over a logical bar
//! range and a price range; engines that do not bring their own transform
//! (the headless engine, the terminal engine) use it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

/// Pixel position relative to the chart container's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True if `other` lies entirely inside `self`, within rounding.
    pub fn encloses(&self, other: &Rect) -> bool {
        const SLACK: f64 = 1e-9;
        other.x >= self.x - SLACK
            && other.y >= self.y - SLACK
            && other.right() <= self.right() + SLACK
            && other.bottom() <= self.bottom() + SLACK
    }
}

/// Maps semantic chart keys to overlay pixels under the current view.
pub trait CoordinateMapper {
    /// X pixel of the bar on `date`, or `None` if the date is not rendered.
    fn date_to_x(&self, date: NaiveDate) -> Option<f64>;

    /// Y pixel of `price`, or `None` if the price is outside the visible scale.
    fn price_to_y(&self, price: f64) -> Option<f64>;

    fn locate(&self, date: NaiveDate, price: f64) -> Option<Point> {
        Some(Point::new(self.date_to_x(date)?, self.price_to_y(price)?))
    }
}

/// Visible window over bar indices. Fractional edges are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn span(&self) -> f64 {
        self.to - self.from
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

/// Fewest bars a zoom may narrow the window to.
pub const MIN_VISIBLE_BARS: f64 = 5.0;

/// Fraction of the price span added above and below the visible extremes.
const PRICE_PADDING: f64 = 0.05;

/// Linear view transform over an ascending date series.
///
/// Bar `i` is centered at `plot.x + (i - from + 0.5) * spacing` where
/// `spacing = plot.width / (to - from)`. Prices map top-down across the plot
/// height, `high` at `plot.y`.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    dates: Vec<NaiveDate>,
    plot: Rect,
    range: LogicalRange,
    prices: PriceRange,
}

impl ViewTransform {
    pub fn new(bars: &[PriceBar], plot: Rect) -> Self {
        let mut vt = Self {
            dates: bars.iter().map(|b| b.date).collect(),
            plot,
            range: LogicalRange {
                from: 0.0,
                to: bars.len() as f64,
            },
            prices: PriceRange {
                low: 0.0,
                high: 0.0,
            },
        };
        vt.autoscale(bars);
        vt
    }

    pub fn plot(&self) -> Rect {
        self.plot
    }

    pub fn range(&self) -> LogicalRange {
        self.range
    }

    pub fn prices(&self) -> PriceRange {
        self.prices
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Replace the plot box, keeping the logical range.
    pub fn set_plot(&mut self, plot: Rect) -> bool {
        if self.plot == plot {
            return false;
        }
        self.plot = plot;
        true
    }

    pub fn set_range(&mut self, range: LogicalRange) {
        self.range = self.clamp_range(range);
    }

    pub fn bar_spacing(&self) -> f64 {
        let span = self.range.span();
        if span <= 0.0 {
            0.0
        } else {
            self.plot.width / span
        }
    }

    /// Show every bar, but never more than fit at `min_spacing` pixels each;
    /// when that limit applies, the most recent bars are kept.
    pub fn fit(&mut self, min_spacing: f64) {
        let n = self.dates.len() as f64;
        let capacity = if min_spacing > 0.0 {
            (self.plot.width / min_spacing).floor()
        } else {
            n
        };
        let count = n.min(capacity.max(1.0));
        self.range = LogicalRange {
            from: n - count,
            to: n,
        };
    }

    /// Shift the window by `bars` (positive = later dates).
    pub fn pan(&mut self, bars: f64) {
        let r = LogicalRange {
            from: self.range.from + bars,
            to: self.range.to + bars,
        };
        self.range = self.clamp_range(r);
    }

    /// Scale the window span by `factor` (< 1 zooms in) around its right edge.
    pub fn zoom(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let n = self.dates.len() as f64;
        let span = (self.range.span() * factor).clamp(MIN_VISIBLE_BARS.min(n.max(1.0)), n.max(1.0));
        let to = self.range.to;
        self.range = self.clamp_range(LogicalRange {
            from: to - span,
            to,
        });
    }

    /// Keep at least one bar on screen and the window inside the series.
    fn clamp_range(&self, r: LogicalRange) -> LogicalRange {
        let n = self.dates.len() as f64;
        let span = r.span().max(1.0);
        let mut from = r.from;
        if from + span > n {
            from = n - span;
        }
        if from < 0.0 {
            from = 0.0;
        }
        LogicalRange {
            from,
            to: from + span,
        }
    }

    /// Rescale prices to the bars currently in the window, with padding.
    pub fn autoscale(&mut self, bars: &[PriceBar]) {
        let visible = self.visible_indices();
        let window = bars.get(visible).unwrap_or(&[]);
        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        if !low.is_finite() || !high.is_finite() {
            return;
        }
        let span = high - low;
        let pad = if span > 0.0 { span * PRICE_PADDING } else { 1.0 };
        self.prices = PriceRange {
            low: low - pad,
            high: high + pad,
        };
    }

    /// Bar indices whose centers fall inside the plot.
    pub fn visible_indices(&self) -> std::ops::Range<usize> {
        let n = self.dates.len();
        let start = (self.range.from - 0.5).ceil().max(0.0) as usize;
        let end = ((self.range.to - 0.5).ceil().max(0.0) as usize).min(n);
        start.min(end)..end
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    /// X pixel of bar `index`, or `None` outside the plot.
    pub fn index_to_x(&self, index: usize) -> Option<f64> {
        let spacing = self.bar_spacing();
        if spacing <= 0.0 {
            return None;
        }
        let x = self.plot.x + (index as f64 - self.range.from + 0.5) * spacing;
        (x >= self.plot.x && x < self.plot.right()).then_some(x)
    }

    /// Nearest rendered bar under pixel `x`.
    pub fn index_at_x(&self, x: f64) -> Option<usize> {
        let spacing = self.bar_spacing();
        if spacing <= 0.0 || x < self.plot.x || x >= self.plot.right() {
            return None;
        }
        let logical = self.range.from + (x - self.plot.x) / spacing;
        let idx = logical.floor();
        if idx < 0.0 {
            return None;
        }
        let idx = idx as usize;
        self.visible_indices().contains(&idx).then_some(idx)
    }

    pub fn date_at_x(&self, x: f64) -> Option<NaiveDate> {
        self.index_at_x(x).and_then(|i| self.date_at(i))
    }
}

impl CoordinateMapper for ViewTransform {
    fn date_to_x(&self, date: NaiveDate) -> Option<f64> {
        self.index_to_x(self.index_of(date)?)
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        if !self.prices.contains(price) || self.plot.height <= 0.0 {
            return None;
        }
        let span = self.prices.high - self.prices.low;
        if span <= 0.0 {
            return Some(self.plot.y);
        }
        let frac = (self.prices.high - price) / span;
        Some(self.plot.y + frac * (self.plot.height - 1.0).max(0.0))
    }
}
