use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;

/// Validated `EnvFilter` directive string.
///
/// ```
/// use decorator_observe::LoggerLevel;
///
/// let lvl: LoggerLevel = "decorator_core=debug,info".parse().unwrap();
/// assert_eq!(lvl.as_str(), "decorator_core=debug,info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Validate a filter expression.
    ///
    /// # Examples
    /// ```
    /// use decorator_observe::LoggerLevel;
    ///
    /// assert!(LoggerLevel::new("kube=warn,info").is_ok());
    /// assert!(LoggerLevel::new("kube=chatty").is_err());
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    /// The expression exactly as configured.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter. Cannot fail for a value that passed validation.
    ///
    /// # Examples
    /// ```
    /// use decorator_observe::LoggerLevel;
    ///
    /// let lvl: LoggerLevel = "decorator_core=trace,info".parse().unwrap();
    /// assert!(lvl.to_env_filter().is_ok());
    /// ```
    pub fn to_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.0).map_err(|e| LoggerError::InvalidLevel(format!("{}: {e}", self.0)))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        EnvFilter::try_new(&s)
            .map(|_| Self(s.clone()))
            .map_err(|e| LoggerError::InvalidLevel(format!("{s}: {e}")))
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}
