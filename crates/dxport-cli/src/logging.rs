//! Logging and tracing setup for the `dxport` binary
//!
//! Human-readable logs go to stderr so stdout stays clean for the job
//! summary. A daily-rotated JSON log file can be enabled for bug reports.
//! `RUST_LOG` overrides the configured filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CRATES: &[&str] = &["dxport_cli", "dxport_core", "dxport_interchange", "dxport_sqlite"];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where JSON log files are written
    pub log_dir: PathBuf,

    /// Whether to write JSON logs to a rotating file
    pub enable_json_logs: bool,

    /// Whether to write human-readable logs to stderr
    pub enable_console_logs: bool,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Whether to log span open/close events (per-job timing)
    pub enable_spans: bool,

    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: cfg!(debug_assertions),
            enable_spans: cfg!(debug_assertions),
            default_filter: filter_for("warn", "debug"),
        }
    }
}

impl LoggingConfig {
    /// Warnings plus job start/finish lines
    pub fn production() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: filter_for("warn", "info"),
        }
    }

    /// Verbose console output with spans and source locations
    pub fn development() -> Self {
        Self::default()
    }

    /// Development settings in debug builds, production otherwise
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Console only, everything at debug
    #[allow(dead_code)]
    pub fn testing() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("dxport-tests"),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: true,
            enable_spans: true,
            default_filter: "debug".to_string(),
        }
    }

    /// Raise the dxport crates' level by one step per `-v`
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "debug",
            _ => "trace",
        };
        self.default_filter = filter_for("warn", level);
        self
    }

    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.enable_json_logs = enabled;
        self
    }
}

fn filter_for(global: &str, ours: &str) -> String {
    let mut filter = global.to_string();
    for krate in CRATES {
        filter.push_str(&format!(",{}={}", krate, ours));
    }
    filter
}

/// Install the global subscriber
///
/// The returned guard flushes the JSON log file; keep it alive until exit.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW rather than ENTER: async spans are re-entered on every poll
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_writer(std::io::stderr)
            .compact()
            .with_filter(env_filter.clone())
            .boxed();
        layers.push(console_layer);
    }

    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "dxport.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_enabled = config.enable_json_logs,
        "logging initialized"
    );

    Ok(guard)
}

/// Where JSON log files go
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dxport")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn production_keeps_console_and_skips_files() {
        let config = LoggingConfig::production();
        assert!(config.enable_console_logs);
        assert!(!config.enable_json_logs);
        assert!(!config.include_location);
        assert!(config.default_filter.starts_with("warn,"));
        assert!(config.default_filter.contains("dxport_interchange=info"));
    }

    #[test]
    fn verbosity_raises_crate_levels() {
        let base = LoggingConfig::production();
        assert_eq!(base.clone().with_verbosity(0).default_filter, base.default_filter);

        let debug = base.clone().with_verbosity(1);
        assert!(debug.default_filter.contains("dxport_sqlite=debug"));

        let trace = base.with_verbosity(3);
        assert!(trace.default_filter.contains("dxport_cli=trace"));
        assert!(trace.default_filter.starts_with("warn,"));
    }

    #[test]
    fn testing_config_logs_everything_to_console() {
        let config = LoggingConfig::testing();
        assert_eq!(config.default_filter, "debug");
        assert!(config.enable_console_logs);
        assert!(!config.enable_json_logs);
    }

    #[test]
    fn json_logs_can_be_switched_on() {
        let config = LoggingConfig::production().with_json_logs(true);
        assert!(config.enable_json_logs);
    }

    #[test]
    fn log_directory_is_namespaced() {
        assert!(log_directory().ends_with("dxport/logs"));
    }
}
