//! Event tooltips: state, content and placement.

mod content;
mod placement;
mod state;

pub use content::{TooltipContent, TooltipLine};
pub use placement::{dock_bottom, place, place_beside, Placement};
pub use state::{TooltipMachine, TooltipState};

use serde::Serialize;

/// A tooltip ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub content: TooltipContent,
    pub placement: Placement,
    pub pinned: bool,
    /// Highlighted row; only meaningful when pinned.
    pub highlighted: usize,
}
