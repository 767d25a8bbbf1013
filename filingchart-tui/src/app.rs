//! Application state: single-owner, main-thread only.
//!
//! The app owns the ticker library and one chart host. Every frame it
//! re-mounts the current ticker's inputs (a no-op unless they changed),
//! drains chart events and runs timers.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use ratatui::layout::Rect as CellRect;
use tracing::{error, info, warn};

use filingchart_core::coords::{Point, Size};
use filingchart_core::domain::FilingEvent;
use filingchart_core::host::MountOutcome;
use filingchart_core::viewport::Modality;
use filingchart_core::{ChartHost, ChartInputs, HostStatus, OverlayConfig};

use crate::engine::TerminalChart;
use crate::ui;

/// Modal overlays drawn above the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Help,
    /// Full detail of a selected event.
    Detail(Box<FilingEvent>),
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

pub struct AppState {
    pub running: bool,
    pub library: Vec<ChartInputs>,
    pub selected: usize,
    pub host: ChartHost<TerminalChart>,
    pub overlay: Overlay,
    pub status_message: Option<(String, StatusLevel)>,
    /// Whole terminal, in cells.
    pub screen: CellRect,
    /// Chart container on screen; overlay coordinates are relative to it.
    pub chart_area: CellRect,
    /// Set after a failed mount; cleared by a resize or a ticker switch.
    mount_blocked: bool,
    selection: Rc<RefCell<Option<FilingEvent>>>,
}

impl AppState {
    pub fn new(library: Vec<ChartInputs>, config: OverlayConfig, force_touch: bool) -> Self {
        let mut host = ChartHost::new(config);
        if force_touch {
            host.force_modality(Some(Modality::Touch));
        }
        let selection: Rc<RefCell<Option<FilingEvent>>> = Rc::default();
        let inbox = Rc::clone(&selection);
        host.on_select(move |event| {
            *inbox.borrow_mut() = Some(event.clone());
        });
        Self {
            running: true,
            library,
            selected: 0,
            host,
            overlay: Overlay::None,
            status_message: None,
            screen: CellRect::default(),
            chart_area: CellRect::default(),
            mount_blocked: false,
            selection,
        }
    }

    pub fn current_inputs(&self) -> Option<&ChartInputs> {
        self.library.get(self.selected)
    }

    pub fn current_ticker(&self) -> Option<&str> {
        self.current_inputs().map(|i| i.ticker.as_str())
    }

    /// Terminal resized (or first frame): lay out the screen, then size the
    /// host container to the chart area that will actually be drawn.
    pub fn on_resize(&mut self, screen: CellRect) {
        if screen == self.screen {
            return;
        }
        self.screen = screen;
        let viewport = Size::new(f64::from(screen.width), f64::from(screen.height));
        let modality = self.host.modality_for(viewport);
        self.chart_area = ui::screen_layout(screen, modality).chart;
        let container = Size::new(
            f64::from(self.chart_area.width),
            f64::from(self.chart_area.height),
        );
        self.host.resize_to(viewport, container);
        self.mount_blocked = false;
    }

    /// Mount the current ticker. Cheap when nothing changed.
    pub fn sync(&mut self, now: Instant) {
        if self.mount_blocked {
            return;
        }
        let Some(inputs) = self.current_inputs().cloned() else {
            self.host.unmount();
            return;
        };
        let container = self.host.container();
        let min_spacing = self.host.config().viewport.min_bar_spacing;
        let ticker = inputs.ticker.clone();
        match self
            .host
            .mount(inputs, container, now, |size| TerminalChart::open(size, min_spacing))
        {
            Ok(MountOutcome::Unchanged) => {}
            Ok(MountOutcome::Built { markers: 0 }) => {
                self.set_warning(format!("{ticker}: no filings on charted days"));
            }
            Ok(MountOutcome::Built { markers }) => {
                self.set_status(format!("{ticker}: {markers} markers"));
            }
            Ok(MountOutcome::Empty) => {
                info!(%ticker, "chart requested for ticker without price data");
                self.host
                    .show_notice(format!("{ticker} is not supported yet"), now);
            }
            Err(e) => {
                error!(%ticker, error = %e, "chart construction failed");
                self.set_error(e.to_string());
                self.mount_blocked = true;
            }
        }
    }

    /// Called after every drawn frame.
    pub fn after_frame(&mut self, now: Instant) {
        if let Some(chart) = self.host.engine_mut() {
            chart.frame_drawn();
        }
        self.host.pump();
        self.host.tick(now);
    }

    pub fn next_ticker(&mut self) {
        if self.library.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.library.len();
        self.mount_blocked = false;
    }

    pub fn prev_ticker(&mut self) {
        if self.library.is_empty() {
            return;
        }
        self.selected = (self.selected + self.library.len() - 1) % self.library.len();
        self.mount_blocked = false;
    }

    /// Switch between pointer and touch layouts.
    pub fn toggle_touch(&mut self) {
        let touch = self.host.modality() == Modality::Touch;
        let forced = if touch { Modality::Pointer } else { Modality::Touch };
        self.host.force_modality(Some(forced));
        let screen = self.screen;
        self.screen = CellRect::default();
        self.on_resize(screen);
        self.set_status(match forced {
            Modality::Touch => "Touch layout: tap markers, tooltips dock at the bottom",
            Modality::Pointer => "Pointer layout: hover to preview, click to pin",
        });
    }

    /// Screen cell → chart container point (cell centers).
    pub fn chart_point(&self, column: u16, row: u16) -> Point {
        Point::new(
            f64::from(column) - f64::from(self.chart_area.x) + 0.5,
            f64::from(row) - f64::from(self.chart_area.y) + 0.5,
        )
    }

    pub fn in_chart(&self, column: u16, row: u16) -> bool {
        let a = self.chart_area;
        column >= a.x && column < a.right() && row >= a.y && row < a.bottom()
    }

    /// Open the detail overlay for the highlighted row of a pinned tooltip.
    pub fn select_highlighted(&mut self) {
        if self.host.select_highlighted().is_none() {
            return;
        }
        if let Some(event) = self.selection.borrow_mut().take() {
            self.overlay = Overlay::Detail(Box::new(event));
        }
    }

    pub fn status_text(&self) -> String {
        match self.host.status() {
            HostStatus::Unmounted => "no chart".into(),
            HostStatus::NoPriceData => "no price data".into(),
            HostStatus::Unannotated => "no filings on chart".into(),
            HostStatus::Annotated { markers } => format!("{markers} markers"),
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{msg}");
        self.status_message = Some((msg, StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}
