use std::io::IsTerminal;

use crate::logger::{format::LoggerFormat, level::LoggerLevel};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color,
        }
    }
}

impl LoggerConfig {
    /// Config from `BEACON_LOG_FORMAT` / `BEACON_LOG_LEVEL`, defaults for whatever is unset.
    pub fn from_env() -> Result<Self, crate::LoggerError> {
        let mut cfg = Self::default();
        if let Ok(format) = std::env::var("BEACON_LOG_FORMAT") {
            cfg.format = format.parse()?;
        }
        if let Ok(level) = std::env::var("BEACON_LOG_LEVEL") {
            cfg.level = LoggerLevel::new(&level)?;
        }
        Ok(cfg)
    }
}
