use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use scriptrun_splitter::{DoubledDelimiter, SplitOptions, TrailingFragment, DEFAULT_DELIMITER};

const DEFAULT_CALLBACK_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CALLBACK_RETRIES: usize = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Directory for rolling file logs, `None` when file logging is off
    pub log_dir: Option<PathBuf>,
    /// Delimiter used when a request carries none
    pub default_delimiter: String,
    pub split_options: SplitOptions,
    /// Log stream name quoted in every response `Reason`
    pub log_stream: String,
    pub callback_timeout: Duration,
    pub callback_retries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env_bool("ENABLE_FILE_LOGS").unwrap_or(false).then(|| {
            PathBuf::from(env_string("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
        });

        let default_delimiter = env_string("SCRIPTRUN_DEFAULT_DELIMITER")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

        let defaults = SplitOptions::default();
        let split_options = SplitOptions {
            retain_delimiter: env_bool("SCRIPTRUN_RETAIN_DELIMITER")
                .unwrap_or(defaults.retain_delimiter),
            doubled_delimiter: env_string("SCRIPTRUN_DOUBLED_DELIMITER")
                .and_then(|v| parse_doubled(&v))
                .unwrap_or(defaults.doubled_delimiter),
            trailing: env_string("SCRIPTRUN_TRAILING")
                .and_then(|v| parse_trailing(&v))
                .unwrap_or(defaults.trailing),
            collapse_newlines: env_bool("SCRIPTRUN_COLLAPSE_NEWLINES")
                .unwrap_or(defaults.collapse_newlines),
        };

        let log_stream =
            env_string("SCRIPTRUN_LOG_STREAM").unwrap_or_else(|| "scriptrun".to_string());

        let callback_timeout = Duration::from_millis(
            env_string("SCRIPTRUN_CALLBACK_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CALLBACK_TIMEOUT_MS),
        );
        let callback_retries = env_string("SCRIPTRUN_CALLBACK_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CALLBACK_RETRIES);

        Self {
            host,
            port,
            log_level,
            log_dir,
            default_delimiter,
            split_options,
            log_stream,
            callback_timeout,
            callback_retries,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            log_level: "info".to_string(),
            log_dir: None,
            default_delimiter: DEFAULT_DELIMITER.to_string(),
            split_options: SplitOptions::default(),
            log_stream: "scriptrun".to_string(),
            callback_timeout: Duration::from_millis(DEFAULT_CALLBACK_TIMEOUT_MS),
            callback_retries: DEFAULT_CALLBACK_RETRIES,
        }
    }
}

fn parse_doubled(value: &str) -> Option<DoubledDelimiter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "terminate" => Some(DoubledDelimiter::Terminate),
        "escape" => Some(DoubledDelimiter::Escape),
        _ => None,
    }
}

fn parse_trailing(value: &str) -> Option<TrailingFragment> {
    match value.trim().to_ascii_lowercase().as_str() {
        "implicit" => Some(TrailingFragment::Implicit),
        "reject" => Some(TrailingFragment::Reject),
        _ => None,
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(key: &str) -> Option<bool> {
    let value = env_string(key)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
