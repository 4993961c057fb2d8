//! Port traits at the IO seams.

pub mod bar_cache_port;
pub mod config_port;
pub mod signal_port;
pub mod tick_port;
