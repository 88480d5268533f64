use std::{net::SocketAddr, time::Duration};

use clap::Parser;

use decorator_metadata::DEFAULT_METADATA_URL;
use decorator_model::LabelPrefix;
use decorator_observe::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Keeps Kubernetes node labels in sync with cloud instance metadata.
#[derive(Parser, Debug)]
#[command(name = "node-decorator", version, about, long_about = None)]
pub struct Cli {
    /// Interval between metadata polls
    #[arg(long, env = "POLL_INTERVAL", default_value = "5m", value_parser = parse_positive_duration)]
    pub poll_interval: Duration,

    /// Upper bound for one metadata fetch or one reconcile pass
    #[arg(long, env = "TIMEOUT", default_value = "30s", value_parser = parse_positive_duration)]
    pub timeout: Duration,

    /// Name of the node this agent decorates
    #[arg(long, env = "NODE_NAME")]
    pub node_name: String,

    /// Prefix of identity labels
    #[arg(long, env = "PREFIX", default_value = "decorator.linode.com")]
    pub prefix: LabelPrefix,

    /// Leading segment of the tag label prefix, joined as `<tags-prefix>.<prefix>`
    #[arg(long, env = "TAGS_PREFIX", default_value = "tags")]
    pub tags_prefix: LabelPrefix,

    /// Base URL of the instance metadata service
    #[arg(long, env = "METADATA_URL", default_value = DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Log filter, e.g. `info` or `decorator_core=debug,info`
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LoggerLevel,

    /// Log output: text, json or journald
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Timezone of log timestamps: utc or local
    #[arg(long, env = "LOG_TIMEZONE", default_value = "utc")]
    pub log_timezone: LoggerTimeZone,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Full prefix of tag labels.
    pub fn tags_label_prefix(&self) -> LabelPrefix {
        self.tags_prefix.nested_under(&self.prefix)
    }
}

/// `humantime` duration that must be greater than zero.
fn parse_positive_duration(s: &str) -> Result<Duration, String> {
    match humantime::parse_duration(s) {
        Ok(d) if d.is_zero() => Err("duration must be greater than zero".to_string()),
        Ok(d) => Ok(d),
        Err(e) => Err(e.to_string()),
    }
}
