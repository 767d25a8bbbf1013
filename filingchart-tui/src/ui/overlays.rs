//! Overlay widgets: key help and filing detail.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use filingchart_core::domain::{form_description, EventKind, FilingEvent};

use crate::theme;
use crate::ui::centered_rect;

const KEYS: &[(&str, &str)] = &[
    ("Tab / n", "next ticker"),
    ("S-Tab / p", "previous ticker"),
    ("h l / \u{2190} \u{2192}", "pan one step"),
    ("H L", "pan five steps"),
    ("+ -", "zoom in / out"),
    ("f", "fit all bars"),
    ("mouse move", "preview filings under the pointer"),
    ("click", "pin the tooltip (touch: open)"),
    ("j k", "move highlight in a pinned tooltip"),
    ("Enter", "open the highlighted filing"),
    ("Esc", "close tooltip or notice"),
    ("t", "toggle touch layout"),
    ("q", "quit"),
];

/// Key reference overlay.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keys [any key]close ")
        .title_style(theme::accent_bold());

    let mut lines = vec![Line::from("")];
    for (key, action) in KEYS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:>14}  "), theme::accent()),
            Span::styled(*action, theme::muted()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to dismiss...",
        theme::neutral(),
    )));

    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, popup);
}

/// Full detail of one filing or press release.
pub fn render_detail(f: &mut Frame, area: Rect, event: &FilingEvent) {
    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);

    let category = event.category();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::rgb(category.color())))
        .title(format!(" {} {} [Esc]close ", event.ticker, event.form_type))
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled("Filing", theme::accent_bold())));
    if !event.company_name.is_empty() {
        metric_line(&mut lines, "Company", &event.company_name);
    }
    metric_line(
        &mut lines,
        "Form",
        &format!("{} ({})", event.form_type, form_description(&event.form_type)),
    );
    metric_line(&mut lines, "Category", category.label());
    metric_line(
        &mut lines,
        "Source",
        match event.kind {
            EventKind::Filing => "SEC filing",
            EventKind::PressRelease => "press release",
        },
    );
    metric_line(&mut lines, "Filed", &event.filed_at.format("%Y-%m-%d %H:%M").to_string());
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Summary", theme::accent_bold())));
    lines.push(Line::from(Span::styled(
        format!("  {}", event.summary()),
        theme::text(),
    )));
    lines.push(Line::from(""));

    if !event.document_url.is_empty() {
        lines.push(Line::from(Span::styled("Document", theme::accent_bold())));
        lines.push(Line::from(Span::styled(
            format!("  {}", event.document_url),
            theme::accent(),
        )));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, inner);
}

fn metric_line<'a>(lines: &mut Vec<Line<'a>>, label: &str, value: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>10}: ", label), theme::muted()),
        Span::styled(value.to_string(), theme::accent()),
    ]));
}
