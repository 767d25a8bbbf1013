//! Bottom status bar: chart status, last message, key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use filingchart_core::viewport::Modality;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    let modality = match app.host.modality() {
        Modality::Pointer => "pointer",
        Modality::Touch => "touch",
    };
    spans.push(Span::styled(format!(" {} ", app.status_text()), theme::accent()));
    spans.push(Span::styled(format!("[{modality}]"), theme::muted()));

    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::text_secondary(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// One-line key hints, shown in the pointer layout only.
pub fn render_keys(f: &mut Frame, area: Rect) {
    let hints = [
        ("Tab", "ticker"),
        ("h/l", "pan"),
        ("+/-", "zoom"),
        ("f", "fit"),
        ("j/k", "highlight"),
        ("Enter", "open"),
        ("Esc", "close"),
        ("t", "touch"),
        ("?", "help"),
        ("q", "quit"),
    ];
    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(key, theme::accent()));
        spans.push(Span::styled(format!(":{action} "), theme::muted()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
