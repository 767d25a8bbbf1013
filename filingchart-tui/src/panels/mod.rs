//! TUI panels
//!
//! - CandleChart: OHLC candles with filing markers, tooltip and notice

pub mod candle_chart;

pub use candle_chart::CandleChart;
