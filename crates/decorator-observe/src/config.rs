use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{format::LoggerFormat, level::LoggerLevel, timer::LoggerTimeZone};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"decorator_core=debug,info"`.
    pub level: LoggerLevel,
    /// Timezone of text and JSON timestamps.
    pub tz: LoggerTimeZone,
    /// Include the event target (module path).
    pub with_targets: bool,
    /// Colorize text output when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Config with the given format and filter; the rest is defaulted.
    ///
    /// # Examples
    /// ```
    /// use decorator_observe::{LoggerConfig, LoggerFormat, LoggerLevel, LoggerTimeZone};
    ///
    /// let cfg = LoggerConfig::new(LoggerFormat::Json, LoggerLevel::new("debug").unwrap());
    /// assert_eq!(cfg.tz, LoggerTimeZone::Utc);
    /// assert!(!cfg.should_use_color());
    /// ```
    pub fn new(format: LoggerFormat, level: LoggerLevel) -> Self {
        Self {
            format,
            level,
            ..Default::default()
        }
    }

    /// ANSI colors are used only for text output on a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.format == LoggerFormat::Text && std::io::stdout().is_terminal()
    }
}
