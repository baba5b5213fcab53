//! `tracing` subscriber setup shared by the binaries.
//!
//! `RUST_LOG`, when set, always wins over the level chosen here.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Filter used when `RUST_LOG` is unset: this crate at `level`, dependencies at `warn`.
pub fn default_directive(level: &str) -> String {
    format!("open_house_etl={},warn", level)
}

pub fn init_logger(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let layer = tracing_subscriber::fmt::layer().with_target(false);
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, if verbose { "debug" } else { "info" });
}
