//! `tracing` subscriber for the report binaries.

use tracing_subscriber::{EnvFilter, fmt};

/// `level` is an `EnvFilter` directive such as `info` or `epl_report=debug`;
/// `format` is `json` or anything else for human-readable lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Sets up chart and query events on stderr; stdout carries the run
    /// summary and the `report_tables` JSON. `RUST_LOG`, when set, replaces
    /// `level`. Only the first call in a process installs anything.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
