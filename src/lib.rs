pub mod api;
pub mod chart;
pub mod core;
pub mod debounce;
pub mod format;
pub mod telemetry;
