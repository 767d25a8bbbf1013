//! Hover / pinned tooltip state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::coords::Point;
use crate::markers::MarkerTable;
use crate::viewport::Modality;

/// Which tooltip, if any, is showing.
///
/// Pinned dominates hovering: while a tooltip is pinned, hover input is
/// ignored, so the two can never be active together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TooltipState {
    #[default]
    Hidden,
    /// Pointer resting on a marker date.
    Hovering { date: NaiveDate, point: Point },
    /// Opened by a click; persists until closed or replaced.
    Pinned { date: NaiveDate, anchor: Point },
}

impl TooltipState {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            TooltipState::Hidden => None,
            TooltipState::Hovering { date, .. } | TooltipState::Pinned { date, .. } => Some(*date),
        }
    }

    pub fn anchor(&self) -> Option<Point> {
        match self {
            TooltipState::Hidden => None,
            TooltipState::Hovering { point, .. } => Some(*point),
            TooltipState::Pinned { anchor, .. } => Some(*anchor),
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, TooltipState::Pinned { .. })
    }

    pub fn is_hovering(&self) -> bool {
        matches!(self, TooltipState::Hovering { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TooltipMachine {
    state: TooltipState,
    modality: Modality,
    /// Highlighted row inside a pinned tooltip.
    highlight: usize,
}

impl TooltipMachine {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn highlighted(&self) -> usize {
        self.highlight
    }

    /// Pointer moved. `date` is the chart date under the pointer, if any.
    ///
    /// Returns true if the state changed.
    pub fn hover(&mut self, date: Option<NaiveDate>, point: Point, table: &MarkerTable) -> bool {
        if self.state.is_pinned() || !self.modality.supports_hover() {
            return false;
        }
        let next = match date.filter(|d| table.contains(*d)) {
            Some(date) => TooltipState::Hovering { date, point },
            None => TooltipState::Hidden,
        };
        self.transition(next)
    }

    /// Click or tap. `anchor` is where a pinned tooltip should attach.
    pub fn click(&mut self, date: Option<NaiveDate>, anchor: Point, table: &MarkerTable) -> bool {
        let marker = date.filter(|d| table.contains(*d));
        let next = match (self.state, marker) {
            (TooltipState::Pinned { date: pinned, .. }, Some(d)) if pinned == d => {
                TooltipState::Hidden
            }
            (_, Some(date)) => {
                self.highlight = 0;
                TooltipState::Pinned { date, anchor }
            }
            (_, None) => TooltipState::Hidden,
        };
        self.transition(next)
    }

    /// Close button inside a pinned tooltip.
    pub fn close(&mut self) -> bool {
        if !self.state.is_pinned() {
            return false;
        }
        self.transition(TooltipState::Hidden)
    }

    /// Hide whatever is showing.
    pub fn dismiss(&mut self) -> bool {
        self.transition(TooltipState::Hidden)
    }

    /// Switching to touch drops any hover tooltip; a pin survives.
    pub fn set_modality(&mut self, modality: Modality) {
        self.modality = modality;
        if !modality.supports_hover() && self.state.is_hovering() {
            self.transition(TooltipState::Hidden);
        }
    }

    /// Move a pinned tooltip's anchor, e.g. when its marker moved.
    pub fn reanchor(&mut self, to: Point) {
        if let TooltipState::Pinned { anchor, .. } = &mut self.state {
            *anchor = to;
        }
    }

    /// Move the highlighted row by `delta`, clamped to `rows`.
    pub fn move_highlight(&mut self, delta: isize, rows: usize) {
        if !self.state.is_pinned() || rows == 0 {
            return;
        }
        let max = rows as isize - 1;
        self.highlight = (self.highlight as isize + delta).clamp(0, max) as usize;
    }

    fn transition(&mut self, next: TooltipState) -> bool {
        if self.state == next {
            return false;
        }
        trace!(from = ?self.state, to = ?next, "tooltip transition");
        if !next.is_pinned() {
            self.highlight = 0;
        }
        self.state = next;
        true
    }
}
