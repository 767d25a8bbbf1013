//! Top-level UI layout: title, legend, chart, status bar and key hints.

pub mod overlays;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use filingchart_core::domain::legend;
use filingchart_core::viewport::Modality;

use crate::app::{AppState, Overlay};
use crate::panels::CandleChart;
use crate::theme::{self, Theme};

/// Screen regions. Rows outside `chart` are chrome; the host container is
/// sized to `chart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title: Rect,
    pub legend: Rect,
    pub chart: Rect,
    pub status: Rect,
    /// Key hints; dropped in the touch layout.
    pub keys: Option<Rect>,
}

pub fn screen_layout(area: Rect, modality: Modality) -> ScreenLayout {
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ];
    if modality == Modality::Pointer {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    ScreenLayout {
        title: chunks[0],
        legend: chunks[1],
        chart: chunks[2],
        status: chunks[3],
        keys: chunks.get(4).copied(),
    }
}

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let layout = screen_layout(f.area(), app.host.modality());
    let theme = Theme::default();

    render_title(f, layout.title, app);
    render_legend(f, layout.legend);

    let ticker = app.current_ticker().unwrap_or("-");
    let overlay = app.host.view();
    let (bars, view) = match app.host.engine() {
        Some(chart) => (chart.bars(), chart.view()),
        None => (&[][..], None),
    };
    f.render_widget(CandleChart::new(bars, view, &overlay, ticker, &theme), layout.chart);

    status_bar::render(f, layout.status, app);
    if let Some(keys) = layout.keys {
        status_bar::render_keys(f, keys);
    }

    match &app.overlay {
        Overlay::Help => overlays::render_help(f, layout.chart),
        Overlay::Detail(event) => overlays::render_detail(f, layout.chart, event),
        Overlay::None => {}
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(" filingchart ", theme::accent_bold())];
    if let Some(inputs) = app.current_inputs() {
        spans.push(Span::styled(
            format!(" {} ", inputs.ticker),
            theme::text().add_modifier(ratatui::style::Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("[{}/{}]", app.selected + 1, app.library.len()),
            theme::muted(),
        ));
        let company = inputs
            .events
            .iter()
            .map(|e| e.company_name.as_str())
            .find(|n| !n.is_empty());
        if let Some(company) = company {
            spans.push(Span::styled(format!("  {company}"), theme::text_secondary()));
        }
        spans.push(Span::styled(
            format!("  {} bars  {} events", inputs.bars.len(), inputs.events.len()),
            theme::muted(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for entry in legend() {
        spans.push(Span::styled("\u{25cf} ", ratatui::style::Style::default().fg(theme::rgb(entry.color))));
        spans.push(Span::styled(format!("{}   ", entry.label), theme::text_secondary()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
