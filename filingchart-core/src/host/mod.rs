//! Chart host adapter: owns one chart engine and the overlay drawn on it.
//!
//! The host is the single owner of the engine, the marker pool and the
//! tooltip for the current inputs. It is driven by its embedder:
//!
//! - [`ChartHost::mount`] when inputs may have changed (a no-op if they did not)
//! - [`ChartHost::resize`] when the viewport changes, or
//!   [`ChartHost::resize_to`] when the embedder lays out the container itself
//! - [`ChartHost::pump`] to drain engine events
//! - [`ChartHost::tick`] on a timer, for settle retries and notice expiry
//!
//! Any change of inputs destroys the chart and builds a new one; there is no
//! partial update.

mod engine;
mod memory;
mod settle;

pub use engine::{
    ChartEngine, ChartEvent, EngineError, EventQueue, FitCompletion, Subscription,
};
pub use memory::{EngineCall, EngineJournal, MemoryEngine};
pub use settle::{ChartGeneration, SettleQueue};

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::config::OverlayConfig;
use crate::coords::{CoordinateMapper, Size};
use crate::domain::{sort_bars, FilingEvent, PriceBar, Ticker};
use crate::error::OverlayError;
use crate::markers::MarkerTable;
use crate::notice::{Notice, NoticeSlot};
use crate::overlay::{MarkerPool, MarkerVisual};
use crate::tooltip::{place, TooltipContent, TooltipMachine, TooltipState, TooltipView};
use crate::viewport::{chart_size, Modality};

/// Inputs for one chart instance.
///
/// Cloning is cheap. Two inputs are the same instance when they name the same
/// ticker and share the same bar and event collections.
#[derive(Debug, Clone)]
pub struct ChartInputs {
    pub ticker: Ticker,
    pub bars: Rc<[PriceBar]>,
    pub events: Rc<[FilingEvent]>,
}

impl ChartInputs {
    pub fn new(ticker: impl Into<Ticker>, bars: Vec<PriceBar>, events: Vec<FilingEvent>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: bars.into(),
            events: events.into(),
        }
    }

    pub fn same_instance(&self, other: &ChartInputs) -> bool {
        self.ticker == other.ticker
            && Rc::ptr_eq(&self.bars, &other.bars)
            && Rc::ptr_eq(&self.events, &other.events)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Inputs unchanged; nothing was rebuilt.
    Unchanged,
    /// A new chart was constructed.
    Built { markers: usize },
    /// No price data; nothing to chart.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Unmounted,
    /// Mounted inputs had no bars.
    NoPriceData,
    /// Chart built with no markers to show.
    Unannotated,
    Annotated { markers: usize },
}

/// Everything the overlay layer draws.
#[derive(Debug)]
pub struct OverlayView<'a> {
    pub markers: &'a [MarkerVisual],
    pub tooltip: Option<TooltipView>,
    pub notice: Option<&'a Notice>,
}

type SelectFn = Box<dyn FnMut(&FilingEvent)>;

struct Mounted<E> {
    engine: E,
    table: MarkerTable,
    pool: MarkerPool,
    tooltip: TooltipMachine,
    generation: ChartGeneration,
}

impl<E: ChartEngine> Mounted<E> {
    /// Re-sync markers with the engine view; a pinned tooltip follows its
    /// marker while the marker is visible.
    fn reposition(&mut self) -> usize {
        let shown = self.pool.reposition(&self.engine);
        if let TooltipState::Pinned { date, .. } = self.tooltip.state() {
            if let Some(p) = self.pool.position_of(date) {
                self.tooltip.reanchor(p);
            }
        }
        shown
    }
}

pub struct ChartHost<E: ChartEngine> {
    config: OverlayConfig,
    forced_modality: Option<Modality>,
    modality: Modality,
    container: Size,
    inputs: Option<ChartInputs>,
    mounted: Option<Mounted<E>>,
    generation: ChartGeneration,
    settle: SettleQueue,
    notice: NoticeSlot,
    on_select: Option<SelectFn>,
}

impl<E: ChartEngine> fmt::Debug for ChartHost<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartHost")
            .field("ticker", &self.ticker())
            .field("status", &self.status())
            .field("generation", &self.generation)
            .field("modality", &self.modality)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl<E: ChartEngine> ChartHost<E> {
    pub fn new(config: OverlayConfig) -> Self {
        let notice = NoticeSlot::new(config.notice.ttl());
        Self {
            config,
            forced_modality: None,
            modality: Modality::Pointer,
            container: Size::default(),
            inputs: None,
            mounted: None,
            generation: ChartGeneration::default(),
            settle: SettleQueue::default(),
            notice,
            on_select: None,
        }
    }

    /// Pin the modality instead of detecting it from the viewport width.
    pub fn force_modality(&mut self, modality: Option<Modality>) {
        self.forced_modality = modality;
        if let Some(m) = modality {
            self.set_modality(m);
        }
    }

    /// Callback for "show the full detail of this event".
    pub fn on_select(&mut self, f: impl FnMut(&FilingEvent) + 'static) {
        self.on_select = Some(Box::new(f));
    }

    /// Build a chart for `inputs` inside a container of `container` pixels.
    ///
    /// Same inputs as the current chart: nothing happens. Otherwise the
    /// current chart is torn down and a new one built. Engine failures are
    /// returned as-is and leave the host unmounted.
    pub fn mount<F>(
        &mut self,
        inputs: ChartInputs,
        container: Size,
        now: Instant,
        factory: F,
    ) -> Result<MountOutcome, OverlayError>
    where
        F: FnOnce(Size) -> Result<E, EngineError>,
    {
        if self
            .inputs
            .as_ref()
            .is_some_and(|current| current.same_instance(&inputs))
        {
            trace!(ticker = %inputs.ticker, "mount skipped, inputs unchanged");
            return Ok(MountOutcome::Unchanged);
        }

        self.teardown();
        self.container = container;

        if inputs.bars.is_empty() {
            info!(ticker = %inputs.ticker, "no price data, chart not built");
            self.inputs = Some(inputs);
            return Ok(MountOutcome::Empty);
        }

        let bars = sort_bars(&inputs.bars);
        let mut engine = factory(container)?;
        if let Err(e) = engine.load_series(&bars) {
            engine.destroy();
            return Err(e.into());
        }
        for kind in Subscription::ALL {
            engine.subscribe(kind);
        }

        let table = MarkerTable::resolve(&bars, &inputs.events);
        let pool = MarkerPool::build(&table, self.modality, container, &self.config.markers);
        self.generation = self.generation.next();

        let mut mounted = Mounted {
            engine,
            table,
            pool,
            tooltip: TooltipMachine::new(self.modality),
            generation: self.generation,
        };
        let completion = mounted.engine.fit_content();
        mounted.reposition();
        if completion == FitCompletion::Pending {
            self.settle
                .schedule(self.generation, now, self.config.settle.delays());
        }

        let markers = mounted.table.len();
        info!(
            ticker = %inputs.ticker,
            bars = bars.len(),
            events = inputs.events.len(),
            markers,
            generation = %self.generation,
            "chart built"
        );
        self.mounted = Some(mounted);
        self.inputs = Some(inputs);
        Ok(MountOutcome::Built { markers })
    }

    /// Destroy the chart and forget the inputs.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut m) = self.mounted.take() {
            for kind in Subscription::ALL {
                m.engine.unsubscribe(kind);
            }
            m.engine.destroy();
            debug!(generation = %m.generation, "chart torn down");
        }
        self.inputs = None;
    }

    /// Chart size for a viewport, under the modality the viewport implies.
    pub fn target_size(&self, viewport: Size) -> Size {
        chart_size(
            viewport.width,
            viewport,
            self.modality_for(viewport),
            &self.config.viewport,
        )
    }

    /// Modality a viewport implies, unless one is forced.
    pub fn modality_for(&self, viewport: Size) -> Modality {
        self.forced_modality
            .unwrap_or_else(|| Modality::detect(viewport.width, &self.config.viewport))
    }

    /// Viewport resized: resize the chart, then re-sync the overlay.
    pub fn resize(&mut self, viewport: Size) -> Size {
        let size = self.target_size(viewport);
        self.resize_to(viewport, size)
    }

    /// Viewport resized, with the chart's container already laid out by the
    /// caller. The container is taken as-is so marker and tooltip geometry
    /// match the area actually drawn.
    pub fn resize_to(&mut self, viewport: Size, container: Size) -> Size {
        let modality = self.modality_for(viewport);
        let size = Size::new(container.width.max(0.0), container.height.max(0.0));
        self.set_modality(modality);
        self.container = size;
        if let Some(m) = &mut self.mounted {
            m.engine.apply_size(size);
            m.pool.set_layer(size);
            if size.width > 0.0 && size.height > 0.0 {
                m.reposition();
            } else {
                // Nothing is drawn into a collapsed container.
                m.pool.hide_all();
            }
            debug!(width = size.width, height = size.height, ?modality, "chart resized");
        }
        size
    }

    fn set_modality(&mut self, modality: Modality) {
        if self.modality == modality {
            return;
        }
        self.modality = modality;
        if let Some(m) = &mut self.mounted {
            m.tooltip.set_modality(modality);
            m.pool.set_modality(modality, &self.config.markers);
        }
    }

    /// Handle every pending engine event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let Some(m) = self.mounted.as_mut() else {
            return 0;
        };
        let mut handled = 0;
        while let Some(event) = m.engine.poll_event() {
            handled += 1;
            trace!(?event, "chart event");
            match event {
                ChartEvent::VisibleRangeChanged => {
                    m.reposition();
                }
                ChartEvent::LayoutSettled => {
                    let dropped = self.settle.cancel(m.generation);
                    debug!(dropped, "layout settled, remaining retries dropped");
                    m.reposition();
                }
                ChartEvent::Hover { date, point } => {
                    if m.tooltip.hover(date, point, &m.table) && m.tooltip.state().is_hovering() {
                        self.notice.dismiss();
                    }
                }
                ChartEvent::Click { date, point } => {
                    let anchor = date.and_then(|d| m.pool.position_of(d)).unwrap_or(point);
                    if m.tooltip.click(date, anchor, &m.table) && m.tooltip.state().is_pinned() {
                        self.notice.dismiss();
                    }
                }
            }
        }
        handled
    }

    /// Run due settle retries and expire the notice. Returns true if anything
    /// visible may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.notice.expire(now);
        for generation in self.settle.take_due(now) {
            match self.mounted.as_mut() {
                Some(m) if m.generation == generation => {
                    let shown = m.reposition();
                    trace!(%generation, shown, "settle retry");
                    changed = true;
                }
                _ => trace!(%generation, "stale settle retry skipped"),
            }
        }
        changed
    }

    /// Re-sync the overlay with the engine view.
    pub fn reposition(&mut self) -> usize {
        self.mounted.as_mut().map_or(0, Mounted::reposition)
    }

    /// Close button on a pinned tooltip.
    pub fn close_tooltip(&mut self) -> bool {
        self.mounted.as_mut().is_some_and(|m| m.tooltip.close())
    }

    /// Show a transient notice; any tooltip is hidden.
    pub fn show_notice(&mut self, message: impl Into<String>, now: Instant) {
        if let Some(m) = &mut self.mounted {
            m.tooltip.dismiss();
        }
        self.notice.show(message, now);
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.dismiss()
    }

    pub fn move_highlight(&mut self, delta: isize) {
        if let Some(m) = &mut self.mounted {
            if let Some(date) = m.tooltip.state().date() {
                let rows = m.table.events_on(date).len();
                m.tooltip.move_highlight(delta, rows);
            }
        }
    }

    /// Hand the highlighted event of the pinned tooltip to the selection
    /// callback.
    pub fn select_highlighted(&mut self) -> Option<FilingEvent> {
        let m = self.mounted.as_ref()?;
        let state = m.tooltip.state();
        if !state.is_pinned() {
            return None;
        }
        let event = state
            .date()
            .and_then(|d| m.table.events_on(d).get(m.tooltip.highlighted()))
            .cloned()?;
        debug!(event = %event.id, form = %event.form_type, "event selected");
        if let Some(f) = self.on_select.as_mut() {
            f(&event);
        }
        Some(event)
    }

    /// The tooltip as it should be drawn now.
    pub fn tooltip_view(&self) -> Option<TooltipView> {
        let m = self.mounted.as_ref()?;
        let state = m.tooltip.state();
        let content = TooltipContent::for_date(&m.table, state.date()?)?;
        let placement = place(
            self.modality,
            state.anchor()?,
            content.height(&self.config.tooltip),
            self.container,
            &self.config.tooltip,
        );
        Some(TooltipView {
            content,
            placement,
            pinned: state.is_pinned(),
            highlighted: m.tooltip.highlighted(),
        })
    }

    pub fn view(&self) -> OverlayView<'_> {
        OverlayView {
            markers: self
                .mounted
                .as_ref()
                .map(|m| m.pool.visuals())
                .unwrap_or(&[]),
            tooltip: self.tooltip_view(),
            notice: self.notice.current(),
        }
    }

    pub fn status(&self) -> HostStatus {
        match (&self.inputs, &self.mounted) {
            (_, Some(m)) if m.table.is_empty() => HostStatus::Unannotated,
            (_, Some(m)) => HostStatus::Annotated {
                markers: m.table.len(),
            },
            (Some(_), None) => HostStatus::NoPriceData,
            (None, None) => HostStatus::Unmounted,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.inputs.as_ref().map(|i| i.ticker.as_str())
    }

    pub fn inputs(&self) -> Option<&ChartInputs> {
        self.inputs.as_ref()
    }

    pub fn engine(&self) -> Option<&E> {
        self.mounted.as_ref().map(|m| &m.engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.mounted.as_mut().map(|m| &mut m.engine)
    }

    /// Date / price mapping of the live chart.
    pub fn mapper(&self) -> Option<&dyn CoordinateMapper> {
        self.mounted
            .as_ref()
            .map(|m| &m.engine as &dyn CoordinateMapper)
    }

    pub fn markers(&self) -> Option<&MarkerTable> {
        self.mounted.as_ref().map(|m| &m.table)
    }

    pub fn tooltip_state(&self) -> TooltipState {
        self.mounted
            .as_ref()
            .map_or(TooltipState::Hidden, |m| m.tooltip.state())
    }

    pub fn generation(&self) -> ChartGeneration {
        self.generation
    }

    pub fn pending_settles(&self) -> usize {
        self.settle.len()
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }
}

impl<E: ChartEngine> Drop for ChartHost<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
