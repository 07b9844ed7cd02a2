//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `tracing` filter directive for this level. Every workspace crate's
    /// target starts with `pip`, so one prefix covers them all.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "pip=trace",
            LogLevel::Debug => "pip=debug",
            LogLevel::Info => "pip=info",
            LogLevel::Warning => "pip=warn",
            LogLevel::Error => "pip=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
