//! Marker pool: one decorative visual per marker, kept in sync with the view.
//!
//! The pool is built once per chart instance and never grows or shrinks.
//! Visuals do not take pointer input; clicks and hovers reach the chart
//! engine, which reports them by date.

use chrono::NaiveDate;
use tracing::trace;

use crate::config::MarkerConfig;
use crate::coords::{CoordinateMapper, Point, Size};
use crate::domain::{FormCategory, Rgb};
use crate::markers::MarkerTable;
use crate::viewport::Modality;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisual {
    pub date: NaiveDate,
    pub category: FormCategory,
    pub price_anchor: f64,
    pub diameter: f64,
    /// Center of the dot; `None` while hidden.
    pub position: Option<Point>,
}

impl MarkerVisual {
    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }

    pub fn color(&self) -> Rgb {
        self.category.color()
    }
}

/// Fixed-size pool of marker visuals inside the overlay layer.
#[derive(Debug, Clone)]
pub struct MarkerPool {
    visuals: Vec<MarkerVisual>,
    offset: f64,
    layer: Size,
}

impl MarkerPool {
    /// Create one hidden visual per marker entry.
    pub fn build(table: &MarkerTable, modality: Modality, layer: Size, config: &MarkerConfig) -> Self {
        let diameter = diameter_for(modality, config);
        let visuals = table
            .entries()
            .iter()
            .map(|entry| MarkerVisual {
                date: entry.date,
                category: entry.category,
                price_anchor: entry.price_anchor,
                diameter,
                position: None,
            })
            .collect();
        Self {
            visuals,
            offset: config.offset_px,
            layer,
        }
    }

    /// Recompute every visual's position from the current view.
    ///
    /// A marker whose date or anchor price cannot be resolved is hidden, never
    /// left at a stale position. Returns the number of visible markers.
    pub fn reposition(&mut self, mapper: &dyn CoordinateMapper) -> usize {
        let mut shown = 0;
        for visual in &mut self.visuals {
            visual.position = mapper
                .locate(visual.date, visual.price_anchor)
                .map(|p| Point::new(p.x, p.y - self.offset));
            if visual.position.is_some() {
                shown += 1;
            }
        }
        trace!(shown, total = self.visuals.len(), "repositioned markers");
        shown
    }

    /// Resize dots for a new modality. Pool membership is unchanged.
    pub fn set_modality(&mut self, modality: Modality, config: &MarkerConfig) {
        let diameter = diameter_for(modality, config);
        for visual in &mut self.visuals {
            visual.diameter = diameter;
        }
    }

    pub fn set_layer(&mut self, layer: Size) {
        self.layer = layer;
    }

    pub fn layer(&self) -> Size {
        self.layer
    }

    pub fn hide_all(&mut self) {
        for visual in &mut self.visuals {
            visual.position = None;
        }
    }

    pub fn visuals(&self) -> &[MarkerVisual] {
        &self.visuals
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.visuals.iter().filter(|v| v.is_visible()).count()
    }

    pub fn position_of(&self, date: NaiveDate) -> Option<Point> {
        self.visuals
            .binary_search_by_key(&date, |v| v.date)
            .ok()
            .and_then(|i| self.visuals[i].position)
    }
}

fn diameter_for(modality: Modality, config: &MarkerConfig) -> f64 {
    match modality {
        Modality::Pointer => config.pointer_size,
        Modality::Touch => config.touch_size,
    }
}
