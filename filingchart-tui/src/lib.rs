//! filingchart TUI: terminal candlestick chart with filing markers.
//!
//! Provides interactive exploration of one ticker at a time with:
//! - Candles drawn by a character-cell chart engine
//! - Filing markers colored by form category, one per trading day
//! - Hover previews and pinned tooltips (docked in the touch layout)
//! - Detail view for a single filing

pub mod app;
pub mod data_loader;
pub mod engine;
pub mod input;
pub mod panels;
pub mod sample_data;
pub mod theme;
pub mod ui;

pub use app::AppState;
pub use engine::TerminalChart;
pub use theme::Theme;
