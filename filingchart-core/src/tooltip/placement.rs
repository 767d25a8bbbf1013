//! Tooltip placement inside the chart container.

use serde::Serialize;

use crate::config::TooltipConfig;
use crate::coords::{Point, Rect, Size};
use crate::viewport::Modality;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub rect: Rect,
    /// Content is taller than `rect` and scrolls internally.
    pub scrollable: bool,
    /// Docked to the bottom edge (touch layouts).
    pub docked: bool,
}

/// Place a tooltip for `modality`.
///
/// Touch tooltips dock to the bottom and ignore `anchor`.
pub fn place(
    modality: Modality,
    anchor: Point,
    content_height: f64,
    container: Size,
    config: &TooltipConfig,
) -> Placement {
    match modality {
        Modality::Pointer => place_beside(anchor, content_height, container, config),
        Modality::Touch => dock_bottom(content_height, container, config),
    }
}

/// Beside the anchor: to the right, flipped left when it would overflow the
/// right edge; above the anchor, dropped below when it would overflow the top.
pub fn place_beside(
    anchor: Point,
    content_height: f64,
    container: Size,
    config: &TooltipConfig,
) -> Placement {
    let width = config.width.min(container.width).max(0.0);
    let height = content_height.min(container.height).max(0.0);

    let mut left = anchor.x + config.gap;
    if left + width > container.width {
        left = anchor.x - width - config.gap;
    }
    let left = left.clamp(0.0, (container.width - width).max(0.0));

    let mut top = anchor.y - height - config.lift;
    if top < 0.0 {
        top = anchor.y + config.gap;
    }
    let top = top.clamp(0.0, (container.height - height).max(0.0));

    Placement {
        rect: Rect::new(left, top, width, height),
        scrollable: content_height > height,
        docked: false,
    }
}

/// Full width along the bottom edge, bounded by the touch max height.
pub fn dock_bottom(content_height: f64, container: Size, config: &TooltipConfig) -> Placement {
    let height = content_height
        .min(config.touch_max_height)
        .min(container.height)
        .max(0.0);
    Placement {
        rect: Rect::new(0.0, container.height - height, container.width, height),
        scrollable: content_height > height,
        docked: true,
    }
}
