//! Concrete adapter implementations for ports.

pub mod csv_bar_cache;
pub mod csv_signal_adapter;
pub mod csv_tick_adapter;
pub mod file_config_adapter;
