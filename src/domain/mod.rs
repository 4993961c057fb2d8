//! Core domain types and logic.

pub mod aggregation;
pub mod bar_aggregator;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod run_config;
pub mod session;
pub mod signal;
pub mod strategy;
pub mod sweep;
pub mod tick;
