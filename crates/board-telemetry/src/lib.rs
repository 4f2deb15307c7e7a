//! # Board Telemetry
//!
//! Logging and metrics shared by the server and client crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use board_telemetry::{init_logging, register_metrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config)?;
//! register_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BOARD_SERVICE_NAME` | `board-ordering` | Service name attached to logs |
//! | `BOARD_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BOARD_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `BOARD_CONSOLE_OUTPUT` | `true` | Write logs to stderr at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Increment a counter, optionally with label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
