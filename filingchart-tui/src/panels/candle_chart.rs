//! Candle chart panel - OHLC candles with the filing overlay on top
//!
//! Renders the chart using direct buffer writes:
//! - Each bar = one column at the view's x for that bar
//! - Body: block char, green if close >= open, pink otherwise
//! - Wicks: vertical line chars to high/low
//! - Markers: one dot per visible marker, in its category color
//! - Tooltip and notice boxes drawn last, over everything else

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use filingchart_core::coords::{CoordinateMapper, ViewTransform};
use filingchart_core::domain::PriceBar;
use filingchart_core::host::OverlayView;
use filingchart_core::tooltip::TooltipView;

use crate::engine::AXIS_WIDTH;
use crate::theme::{self, Theme};

const MARKER: &str = "\u{25cf}";
const PINNED_MARKER: &str = "\u{25c9}";

/// Rows one tooltip entry takes.
const ENTRY_ROWS: u16 = 3;

/// Candle chart with its overlay
pub struct CandleChart<'a> {
    bars: &'a [PriceBar],
    view: Option<&'a ViewTransform>,
    overlay: &'a OverlayView<'a>,
    ticker: &'a str,
    theme: &'a Theme,
}

impl<'a> CandleChart<'a> {
    pub fn new(
        bars: &'a [PriceBar],
        view: Option<&'a ViewTransform>,
        overlay: &'a OverlayView<'a>,
        ticker: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            bars,
            view,
            overlay,
            ticker,
            theme,
        }
    }

    fn render_candles(&self, view: &ViewTransform, area: Rect, buf: &mut Buffer) {
        let plot = view.plot();
        let plot_top = area.y + plot.y as u16;
        let plot_rows = (plot.height as u16).min(area.bottom().saturating_sub(plot_top));
        if plot_rows == 0 {
            return;
        }
        let last_row = plot_top + plot_rows - 1;
        let row_of = |price: f64| -> Option<u16> {
            view.price_to_y(price)
                .map(|y| (area.y + y.floor().max(0.0) as u16).clamp(plot_top, last_row))
        };

        // Y-axis labels: top, middle, bottom of the price scale.
        let prices = view.prices();
        let label_rows = [0, plot_rows / 2, plot_rows - 1];
        for row in label_rows {
            let frac = if plot_rows > 1 {
                f64::from(row) / f64::from(plot_rows - 1)
            } else {
                0.0
            };
            let price = prices.high - frac * (prices.high - prices.low);
            let label = format!("{:>7.2}", price);
            buf.set_string(area.x, plot_top + row, label, Style::default().fg(self.theme.muted));
        }

        for idx in view.visible_indices() {
            let Some(bar) = self.bars.get(idx) else {
                continue;
            };
            let Some(x) = view.index_to_x(idx) else {
                continue;
            };
            let col = area.x + x.floor() as u16;
            if col >= area.right() {
                continue;
            }
            let style = Style::default().fg(self.theme.candle_color(bar.is_up()));
            let (Some(high), Some(low), Some(body_top), Some(body_bot)) = (
                row_of(bar.high),
                row_of(bar.low),
                row_of(bar.open.max(bar.close)),
                row_of(bar.open.min(bar.close)),
            ) else {
                continue;
            };

            // Upper wick, body, lower wick
            for row in high..body_top {
                buf.set_string(col, row, "\u{2502}", style);
            }
            let body = if bar.is_up() { "\u{2588}" } else { "\u{2593}" };
            for row in body_top..=body_bot {
                buf.set_string(col, row, body, style);
            }
            for row in body_bot.saturating_add(1)..=low {
                buf.set_string(col, row, "\u{2502}", style);
            }
        }

        // X-axis: a date label roughly every 16 columns.
        let axis_row = plot_top + plot_rows;
        if axis_row < area.bottom() {
            let mut next_free = area.x + AXIS_WIDTH;
            for idx in view.visible_indices() {
                let (Some(x), Some(date)) = (view.index_to_x(idx), view.date_at(idx)) else {
                    continue;
                };
                let col = area.x + x.floor() as u16;
                if col < next_free || col + 10 > area.right() {
                    continue;
                }
                buf.set_string(
                    col,
                    axis_row,
                    date.format("%Y-%m-%d").to_string(),
                    Style::default().fg(self.theme.muted),
                );
                next_free = col + 16;
            }
        }
    }

    fn render_markers(&self, view: &ViewTransform, area: Rect, buf: &mut Buffer) {
        let plot = view.plot();
        let top = area.y + plot.y as u16;
        let bottom = (area.y + (plot.y + plot.height) as u16).min(area.bottom());
        if bottom <= top {
            return;
        }
        let pinned = self
            .overlay
            .tooltip
            .as_ref()
            .filter(|t| t.pinned)
            .map(|t| t.content.date);

        for marker in self.overlay.markers {
            let Some(p) = marker.position else {
                continue;
            };
            let col = area.x + p.x.floor().max(0.0) as u16;
            let row = (area.y + p.y.floor().max(0.0) as u16).clamp(top, bottom - 1);
            if col >= area.right() {
                continue;
            }
            let (symbol, style) = if pinned == Some(marker.date) {
                (
                    PINNED_MARKER,
                    Style::default()
                        .fg(self.theme.category_color(marker.category))
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                (
                    MARKER,
                    Style::default()
                        .fg(self.theme.category_color(marker.category))
                        .add_modifier(Modifier::BOLD),
                )
            };
            buf.set_string(col, row, symbol, style);
        }
    }
}

impl<'a> Widget for CandleChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.theme.background));

        match self.view {
            Some(view) if !self.bars.is_empty() => {
                self.render_candles(view, area, buf);
                self.render_markers(view, area, buf);
            }
            _ => {
                let msg = format!("No price data for {}", self.ticker);
                let y = area.y + area.height / 2;
                let x = area.x + area.width.saturating_sub(msg.len() as u16) / 2;
                if y < area.bottom() {
                    buf.set_string(x, y, msg, Style::default().fg(self.theme.muted));
                }
            }
        }

        if let Some(tooltip) = &self.overlay.tooltip {
            render_tooltip(tooltip, area, buf, self.theme);
        }
        if let Some(notice) = self.overlay.notice {
            render_notice(&notice.message, area, buf, self.theme);
        }
    }
}

/// Container rect (cells, relative to the chart) → screen rect inside `area`.
fn to_screen(rect: filingchart_core::coords::Rect, area: Rect) -> Rect {
    let x = area.x + rect.x.round().max(0.0) as u16;
    let y = area.y + rect.y.round().max(0.0) as u16;
    let w = (rect.width.round().max(0.0) as u16).min(area.right().saturating_sub(x));
    let h = (rect.height.round().max(0.0) as u16).min(area.bottom().saturating_sub(y));
    Rect::new(x, y, w, h)
}

fn render_tooltip(tooltip: &TooltipView, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let rect = to_screen(tooltip.placement.rect, area);
    if rect.width < 4 || rect.height < 3 {
        return;
    }
    Clear.render(rect, buf);

    let mut title = format!(" {} ", tooltip.content.date.format("%Y-%m-%d"));
    if tooltip.placement.scrollable {
        title.push_str("\u{2195} ");
    }
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if tooltip.pinned { theme.accent } else { theme.muted }))
        .title(Span::styled(title, theme::accent_bold()))
        .style(Style::default().bg(theme.background));
    if tooltip.pinned {
        block = block.title_bottom(Line::from(Span::styled(" [Esc] close ", theme::muted())));
    }
    let inner = block.inner(rect);
    block.render(rect, buf);

    let fits = usize::from((inner.height / ENTRY_ROWS).max(1));
    let start = if tooltip.pinned && tooltip.highlighted >= fits {
        tooltip.highlighted + 1 - fits
    } else {
        0
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in tooltip.content.lines.iter().enumerate().skip(start).take(fits) {
        let color = theme::rgb(entry.color);
        let mut head = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if tooltip.pinned && i == tooltip.highlighted {
            head = head.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{MARKER} {}", entry.form_label), head),
            Span::styled(format!("  {}", entry.description), theme::text_secondary()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.headline),
            theme::text(),
        )));
        let url = if entry.document_url.is_empty() {
            entry.date.format("%Y-%m-%d").to_string()
        } else {
            entry.document_url.clone()
        };
        lines.push(Line::from(Span::styled(format!("  {url}"), theme::muted())));
    }
    Paragraph::new(lines).render(inner, buf);
}

fn render_notice(message: &str, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    if width < 4 || height < 3 {
        return;
    }
    let rect = Rect::new(area.x + (area.width - width) / 2, area.y, width, height);
    Clear.render(rect, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.warning))
        .style(Style::default().bg(theme.background));
    Paragraph::new(Span::styled(message, Style::default().fg(theme.warning)))
        .block(block)
        .render(rect, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use chrono::NaiveDate;
    use filingchart_core::coords::Size;
    use filingchart_core::domain::{parse_filed_at, EventId, EventKind, FilingEvent};
    use filingchart_core::{ChartHost, ChartInputs, OverlayConfig};

    use crate::engine::TerminalChart;

    fn make_test_bars() -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        [
            (100.0, 102.0, 99.0, 101.0),  // up
            (101.0, 103.0, 100.0, 100.5), // down
            (100.5, 104.0, 99.5, 103.0),  // up
            (103.0, 105.0, 101.0, 102.0), // down
            (102.0, 106.0, 101.5, 105.5), // up
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (open, high, low, close))| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 0,
        })
        .collect()
    }

    fn make_event(day: &str, form: &str, headline: &str) -> FilingEvent {
        FilingEvent {
            id: EventId(1),
            ticker: "SPY".into(),
            company_name: String::new(),
            form_type: form.into(),
            description: String::new(),
            filed_at: parse_filed_at(day).unwrap(),
            headline: Some(headline.into()),
            document_url: String::new(),
            kind: EventKind::Filing,
        }
    }

    fn mounted(events: Vec<FilingEvent>) -> ChartHost<TerminalChart> {
        let mut host = ChartHost::new(OverlayConfig::terminal());
        let size = host.resize(Size::new(80.0, 28.0));
        host.mount(
            ChartInputs::new("SPY", make_test_bars(), events),
            size,
            Instant::now(),
            |s| TerminalChart::open(s, 1.0),
        )
        .unwrap();
        host.pump();
        host
    }

    fn render(host: &ChartHost<TerminalChart>) -> Buffer {
        let theme = Theme::default();
        let chart = host.engine().unwrap();
        let overlay = host.view();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        CandleChart::new(chart.bars(), chart.view(), &overlay, "SPY", &theme).render(area, &mut buf);
        buf
    }

    fn content(buf: &Buffer) -> String {
        let area = buf.area;
        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_candle_chart_renders_candles_and_axis() {
        let host = mounted(vec![]);
        let text = content(&render(&host));
        assert!(text.contains('\u{2588}'));
        assert!(text.contains('\u{2593}'));
        assert!(text.contains("2024-01-01"));
        assert!(!text.contains(MARKER));
    }

    #[test]
    fn test_marker_drawn_in_category_color() {
        let host = mounted(vec![make_event("2024-01-03", "10-K", "Annual")]);
        let buf = render(&host);
        let p = host.view().markers[0].position.unwrap();
        let cell = buf.cell((p.x.floor() as u16, p.y.floor().max(0.0) as u16)).unwrap();
        assert_eq!(cell.symbol(), MARKER);
        assert_eq!(cell.fg, ratatui::style::Color::Rgb(0x3b, 0x82, 0xf6));
    }

    #[test]
    fn test_pinned_tooltip_lists_events() {
        let mut host = mounted(vec![
            make_event("2024-01-03", "8-K", "Material agreement"),
            make_event("2024-01-03", "4", "Director purchase"),
        ]);
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let x = host.mapper().unwrap().date_to_x(date).unwrap();
        host.engine_mut()
            .unwrap()
            .pointer_click(filingchart_core::coords::Point::new(x, 10.5));
        host.pump();
        assert!(host.tooltip_state().is_pinned());

        let text = content(&render(&host));
        assert!(text.contains("2024-01-03"));
        assert!(text.contains("Material agreement"));
        assert!(text.contains("Director purchase"));
        assert!(text.contains("Current Report"));
        assert!(text.contains("[Esc] close"));
        assert!(text.contains(PINNED_MARKER));
    }

    #[test]
    fn test_notice_is_drawn() {
        let mut host = mounted(vec![]);
        host.show_notice("QQQ is not supported yet", Instant::now());
        let text = content(&render(&host));
        assert!(text.contains("QQQ is not supported yet"));
    }

    #[test]
    fn test_empty_chart_says_no_data() {
        let theme = Theme::default();
        let host: ChartHost<TerminalChart> = ChartHost::new(OverlayConfig::terminal());
        let overlay = host.view();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        CandleChart::new(&[], None, &overlay, "ZZZZ", &theme).render(area, &mut buf);
        assert!(content(&buf).contains("No price data for ZZZZ"));
    }
}
