//! Input dispatch: overlays first, then global keys, then chart keys.
//!
//! Mouse motion and clicks are forwarded to the chart engine as pointer
//! events; the host turns them into tooltip transitions on the next pump.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use filingchart_core::ChartEngine;

use crate::app::{AppState, Overlay};

/// Zoom factor for one zoom-in step; zooming out uses the inverse.
const ZOOM_STEP: f64 = 0.8;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::Detail(_) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Tab | KeyCode::Char('n') => {
            app.next_ticker();
            return;
        }
        KeyCode::BackTab | KeyCode::Char('p') => {
            app.prev_ticker();
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_touch();
            return;
        }
        _ => {}
    }

    // 3. Chart keys.
    handle_chart_key(app, key);
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if !app.host.close_tooltip() {
                app.host.dismiss_notice();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.host.move_highlight(1),
        KeyCode::Char('k') | KeyCode::Up => app.host.move_highlight(-1),
        KeyCode::Enter => app.select_highlighted(),
        KeyCode::Char('h') | KeyCode::Left => pan(app, -1.0),
        KeyCode::Char('l') | KeyCode::Right => pan(app, 1.0),
        KeyCode::Char('H') => pan(app, -5.0),
        KeyCode::Char('L') => pan(app, 5.0),
        KeyCode::Char('+') | KeyCode::Char('=') => zoom(app, ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => zoom(app, 1.0 / ZOOM_STEP),
        KeyCode::Char('f') => {
            if let Some(chart) = app.host.engine_mut() {
                chart.fit_content();
            }
        }
        _ => {}
    }
}

fn pan(app: &mut AppState, steps: f64) {
    if let Some(chart) = app.host.engine_mut() {
        let step = chart.pan_step();
        chart.pan(step * steps);
    }
}

fn zoom(app: &mut AppState, factor: f64) {
    if let Some(chart) = app.host.engine_mut() {
        chart.zoom(factor);
    }
}

pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.overlay != Overlay::None {
        if matches!(mouse.kind, MouseEventKind::Down(_)) {
            app.overlay = Overlay::None;
        }
        return;
    }
    let point = app.chart_point(mouse.column, mouse.row);
    let inside = app.in_chart(mouse.column, mouse.row);
    let Some(chart) = app.host.engine_mut() else {
        return;
    };
    match mouse.kind {
        MouseEventKind::Moved => chart.pointer_move(point),
        MouseEventKind::Down(MouseButton::Left) if inside => chart.pointer_click(point),
        MouseEventKind::ScrollUp if inside => chart.zoom(ZOOM_STEP),
        MouseEventKind::ScrollDown if inside => chart.zoom(1.0 / ZOOM_STEP),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    use filingchart_core::tooltip::TooltipState;
    use filingchart_core::OverlayConfig;

    use crate::data_loader::{load_library, LoadConfig};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn ready_app() -> AppState {
        let library = load_library(&LoadConfig::sample()).unwrap();
        let mut app = AppState::new(library, OverlayConfig::terminal(), false);
        app.on_resize(Rect::new(0, 0, 120, 40));
        let now = Instant::now();
        app.sync(now);
        app.after_frame(now);
        app
    }

    /// Screen cell of the bar under the first visible marker.
    fn marker_cell(app: &AppState) -> (u16, u16) {
        let p = app
            .host
            .view()
            .markers
            .iter()
            .find_map(|m| m.position)
            .unwrap();
        (
            app.chart_area.x + p.x.floor() as u16,
            app.chart_area.y + (p.y + 1.0).floor() as u16,
        )
    }

    #[test]
    fn q_quits() {
        let mut app = ready_app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = ready_app();
        let mut k = key(KeyCode::Char('q'));
        k.kind = KeyEventKind::Release;
        handle_key(&mut app, k);
        assert!(app.running);
    }

    #[test]
    fn tab_switches_ticker() {
        let mut app = ready_app();
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_ticker(), Some("LUNR"));
        handle_key(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_ticker(), Some("ASTS"));
    }

    #[test]
    fn pan_moves_window_and_markers_follow() {
        let mut app = ready_app();
        let before = app.host.engine().unwrap().view().unwrap().range();
        handle_key(&mut app, key(KeyCode::Char('h')));
        app.host.pump();
        let after = app.host.engine().unwrap().view().unwrap().range();
        assert!(after.from < before.from);

        let first: Vec<_> = app.host.view().markers.iter().map(|m| m.position).collect();
        app.host.reposition();
        let second: Vec<_> = app.host.view().markers.iter().map(|m| m.position).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn zoom_in_narrows_window() {
        let mut app = ready_app();
        let before = app.host.engine().unwrap().view().unwrap().range().span();
        handle_key(&mut app, key(KeyCode::Char('+')));
        let after = app.host.engine().unwrap().view().unwrap().range().span();
        assert!(after < before);
    }

    #[test]
    fn hover_then_leave_hides_tooltip() {
        let mut app = ready_app();
        let (col, row) = marker_cell(&app);
        handle_mouse(&mut app, mouse(MouseEventKind::Moved, col, row));
        app.host.pump();
        assert!(app.host.tooltip_state().is_hovering());

        handle_mouse(&mut app, mouse(MouseEventKind::Moved, 0, 0));
        app.host.pump();
        assert_eq!(app.host.tooltip_state(), TooltipState::Hidden);
    }

    #[test]
    fn click_pins_and_esc_closes() {
        let mut app = ready_app();
        let (col, row) = marker_cell(&app);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), col, row));
        app.host.pump();
        assert!(app.host.tooltip_state().is_pinned());

        // Hover elsewhere does not move a pinned tooltip.
        handle_mouse(&mut app, mouse(MouseEventKind::Moved, 0, 0));
        app.host.pump();
        assert!(app.host.tooltip_state().is_pinned());

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.host.tooltip_state(), TooltipState::Hidden);
    }

    #[test]
    fn click_outside_chart_keeps_tooltip_pinned() {
        let mut app = ready_app();
        let (col, row) = marker_cell(&app);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), col, row));
        app.host.pump();
        assert!(app.host.tooltip_state().is_pinned());

        let legend_row = app.chart_area.y - 1;
        let status_row = app.chart_area.bottom();
        for row in [0, legend_row, status_row] {
            assert!(!app.in_chart(col, row));
            handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), col, row));
            app.host.pump();
            assert!(app.host.tooltip_state().is_pinned(), "row {row}");
        }
    }

    #[test]
    fn enter_on_pinned_tooltip_opens_detail_and_esc_closes_it() {
        let mut app = ready_app();
        let (col, row) = marker_cell(&app);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), col, row));
        app.host.pump();
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::Detail(_)));

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
        // The tooltip stays pinned under the detail view.
        assert!(app.host.tooltip_state().is_pinned());
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let mut app = ready_app();
        handle_key(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.overlay, Overlay::Help);
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.running);
    }
}
