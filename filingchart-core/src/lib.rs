//! filingchart core: filing markers and tooltips over a candlestick chart.
//!
//! This crate contains the annotation overlay engine:
//! - Domain types (price bars, filing events, form categories)
//! - Marker resolution with per-date category priority
//! - Coordinate mapping and the fixed marker pool
//! - Hover / pinned tooltip state machine, content and placement
//! - Chart host adapter over an injected chart engine
//! - Price and event providers, TOML configuration

pub mod config;
pub mod coords;
pub mod domain;
pub mod error;
pub mod host;
pub mod markers;
pub mod notice;
pub mod overlay;
pub mod source;
pub mod tooltip;
pub mod viewport;

pub use config::OverlayConfig;
pub use error::OverlayError;
pub use host::{ChartEngine, ChartHost, ChartInputs, HostStatus, MemoryEngine};
pub use markers::{MarkerEntry, MarkerTable};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: data and derived types are Send + Sync.
    ///
    /// The host itself is single-threaded, but the inputs it consumes are
    /// loaded off the UI thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::FilingEvent>();
        require_sync::<domain::FilingEvent>();
        require_send::<domain::FormCategory>();
        require_sync::<domain::FormCategory>();

        require_send::<MarkerTable>();
        require_sync::<MarkerTable>();
        require_send::<OverlayConfig>();
        require_sync::<OverlayConfig>();
        require_send::<tooltip::TooltipState>();
        require_sync::<tooltip::TooltipState>();
        require_send::<OverlayError>();
        require_sync::<OverlayError>();
    }

    /// Architecture contract: the tooltip machine reads the marker table,
    /// never the chart engine.
    #[test]
    fn tooltip_machine_takes_no_engine() {
        fn _check(
            m: &mut tooltip::TooltipMachine,
            table: &MarkerTable,
            date: Option<chrono::NaiveDate>,
        ) -> bool {
            m.hover(date, coords::Point::default(), table)
                | m.click(date, coords::Point::default(), table)
        }
    }

    /// Architecture contract: marker positioning only needs a coordinate
    /// mapper, so any engine satisfying it can drive the pool.
    #[test]
    fn pool_repositions_through_mapper_only() {
        fn _check(pool: &mut overlay::MarkerPool, mapper: &dyn coords::CoordinateMapper) -> usize {
            pool.reposition(mapper)
        }
    }
}
