//! Input modality and chart sizing.

use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::coords::Size;

/// How the user points at the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Mouse or trackpad: hover tooltips, tooltips placed beside the anchor.
    #[default]
    Pointer,
    /// Touch screen: no hover, pinned tooltips dock to the bottom.
    Touch,
}

impl Modality {
    /// Touch-sized viewports are the ones narrower than the breakpoint.
    pub fn detect(viewport_width: f64, config: &ViewportConfig) -> Self {
        if viewport_width < config.touch_breakpoint {
            Modality::Touch
        } else {
            Modality::Pointer
        }
    }

    pub fn supports_hover(self) -> bool {
        matches!(self, Modality::Pointer)
    }
}

/// Target chart size for a container inside a viewport.
///
/// Width follows the container; height is the viewport height minus the
/// modality's chrome allowance, never below the configured minimum.
pub fn chart_size(
    container_width: f64,
    viewport: Size,
    modality: Modality,
    config: &ViewportConfig,
) -> Size {
    let chrome = match modality {
        Modality::Pointer => config.pointer_chrome,
        Modality::Touch => config.touch_chrome,
    };
    Size::new(
        container_width.max(0.0),
        (viewport.height - chrome).max(config.min_chart_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_uses_breakpoint() {
        let cfg = ViewportConfig::default();
        assert_eq!(Modality::detect(500.0, &cfg), Modality::Touch);
        assert_eq!(Modality::detect(768.0, &cfg), Modality::Pointer);
        assert_eq!(Modality::detect(1440.0, &cfg), Modality::Pointer);
    }

    #[test]
    fn chrome_allowance_differs_by_modality() {
        let cfg = ViewportConfig::default();
        let viewport = Size::new(1000.0, 900.0);
        assert_eq!(
            chart_size(1000.0, viewport, Modality::Pointer, &cfg),
            Size::new(1000.0, 720.0)
        );
        assert_eq!(
            chart_size(1000.0, viewport, Modality::Touch, &cfg),
            Size::new(1000.0, 760.0)
        );
    }

    #[test]
    fn height_never_below_minimum() {
        let cfg = ViewportConfig::default();
        let size = chart_size(300.0, Size::new(300.0, 150.0), Modality::Touch, &cfg);
        assert_eq!(size.height, cfg.min_chart_height);
    }

    #[test]
    fn only_pointer_hovers() {
        assert!(Modality::Pointer.supports_hover());
        assert!(!Modality::Touch.supports_hover());
    }
}
