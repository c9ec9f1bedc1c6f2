//! Telemetry module for logging and metrics.

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig, LOG_FORMATS, LOG_LEVELS};
pub use metrics::{Counter, MetricsRegistry, NodeStats};
