//! Logging setup for the node decorator.
//!
//! [`init_logger`] installs a global `tracing` subscriber that writes text,
//! JSON or journald records depending on [`LoggerConfig::format`].
mod config;
pub use config::LoggerConfig;

mod error;
pub use error::{LoggerError, LoggerResult};

mod format;
pub use format::LoggerFormat;

mod level;
pub use level::LoggerLevel;

mod timer;
pub use timer::{LoggerTimeZone, LoggerTimer, init_local_offset};

mod init;
pub use init::init_logger;
