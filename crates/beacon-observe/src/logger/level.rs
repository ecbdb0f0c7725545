use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// `EnvFilter` directive string, validated on construction.
///
/// Accepts plain levels (`"info"`) as well as per-target directives
/// (`"info,beacon_discover=debug"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(directive: &str) -> Result<Self, LoggerError> {
        let directive = directive.trim();
        if directive.is_empty() {
            return Err(LoggerError::InvalidLogLevel(directive.to_string()));
        }
        EnvFilter::try_new(directive)
            .map_err(|_| LoggerError::InvalidLogLevel(directive.to_string()))?;
        Ok(Self(directive.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}
