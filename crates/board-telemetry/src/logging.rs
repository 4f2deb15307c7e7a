//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! pretty or a JSON `fmt` layer. Initialization is idempotent: a second call
//! (e.g. from another test) leaves the first subscriber in place.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Returned by [`init_logging`]; records whether this call installed the
/// global subscriber.
#[derive(Debug)]
pub struct LoggingGuard {
    installed: bool,
}

impl LoggingGuard {
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Initialize the global tracing subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let installed = if !config.console_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .is_ok()
    } else if config.json_logs {
        // JSON output for containers/production
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(
            service = %config.service_name,
            json_logs = config.json_logs,
            "Logging initialized"
        );
    }

    Ok(LoggingGuard { installed })
}
