//! Configuration data model and validation

use crate::defaults;
use crate::logging::LogFormat;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Socket address the HTTP server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Route serving the speedtest report
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Relative path of the download payload generator on a target
    #[serde(default = "default_download_path")]
    pub download_path: String,

    /// Relative path of the upload sink on a target
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Relative path of the ping endpoint on a target
    #[serde(default = "default_ping_path")]
    pub ping_path: String,

    /// Relative path of the IP echo endpoint on a target
    #[serde(default = "default_ip_echo_path")]
    pub ip_echo_path: String,

    /// Download/upload timeout applied when a request omits `timeout`
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Ping sample count applied when a request omits `pingCount`
    #[serde(default = "default_ping_count")]
    pub default_ping_count: u32,

    /// Upper bound for a requested `pingCount`
    #[serde(default = "default_max_ping_count")]
    pub max_ping_count: u32,

    /// Size of the generated upload payload
    #[serde(default = "default_upload_size_bytes")]
    pub upload_size_bytes: usize,

    /// Pause after each ping request
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    /// Cap on a single ping request; pings ignore the request `timeout`
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u64,

    /// Verify TLS certificates and host names of targets.
    ///
    /// Off by default: the service measures arbitrary third-party endpoints,
    /// many of them behind self-signed certificates. Turning verification off
    /// is a deliberate security trade-off and is logged at startup.
    #[serde(default)]
    pub verify_tls_certificates: bool,

    /// Treat every inbound request as HTTPS when inferring target schemes
    #[serde(default)]
    pub assume_https: bool,

    /// Mount the built-in garbage/empty/getIP helper routes
    #[serde(default = "default_serve_helpers")]
    pub serve_helpers: bool,

    /// Add the client IP as seen by each target to its report
    #[serde(default)]
    pub report_client_ip: bool,

    /// Tracing filter directive (e.g. `info`, `speedtest_api=debug`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Environment file the configuration was loaded from
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_path: default_api_path(),
            download_path: default_download_path(),
            upload_path: default_upload_path(),
            ping_path: default_ping_path(),
            ip_echo_path: default_ip_echo_path(),
            default_timeout_secs: default_timeout_secs(),
            default_ping_count: default_ping_count(),
            max_ping_count: default_max_ping_count(),
            upload_size_bytes: default_upload_size_bytes(),
            ping_interval_ms: default_ping_interval_ms(),
            ping_timeout_secs: default_ping_timeout_secs(),
            verify_tls_certificates: false,
            assume_https: false,
            serve_helpers: default_serve_helpers(),
            report_client_ip: false,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            verbose: false,
            debug: false,
            env_file: None,
        }
    }
}

impl Config {
    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        SocketAddr::from_str(&self.bind_address).map_err(|e| {
            AppError::config(format!("Invalid bind address '{}': {}", self.bind_address, e))
        })
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if !self.api_path.starts_with('/') {
            return Err(AppError::config(format!(
                "API path must start with '/': {}",
                self.api_path
            )));
        }
        check_route_syntax("api_path", &self.api_path)?;

        for (name, path) in [
            ("download_path", &self.download_path),
            ("upload_path", &self.upload_path),
            ("ping_path", &self.ping_path),
            ("ip_echo_path", &self.ip_echo_path),
        ] {
            if path.trim().is_empty() {
                return Err(AppError::config(format!("{} cannot be empty", name)));
            }
            if path.starts_with('/') {
                return Err(AppError::config(format!(
                    "{} must be relative to the target base URL: {}",
                    name, path
                )));
            }
            if self.serve_helpers {
                check_route_syntax(name, path)?;
            }
            if self.serve_helpers && format!("/{}", path) == self.api_path {
                return Err(AppError::config(format!(
                    "{} collides with the API path {}",
                    name, self.api_path
                )));
            }
        }

        // Upload and ping may share the empty sink; the other roles need their own route
        if self.serve_helpers {
            let sinks = [&self.upload_path, &self.ping_path];
            if sinks.contains(&&self.download_path)
                || sinks.contains(&&self.ip_echo_path)
                || self.download_path == self.ip_echo_path
            {
                return Err(AppError::config(
                    "Helper paths for download, upload/ping and IP echo must differ",
                ));
            }
        }

        if self.upload_size_bytes == 0 {
            return Err(AppError::config("Upload size must be greater than 0"));
        }

        if self.upload_size_bytes > 100_000_000 {
            return Err(AppError::config("Upload size cannot exceed 100000000 bytes"));
        }

        if self.max_ping_count == 0 {
            return Err(AppError::config("Max ping count must be greater than 0"));
        }

        if self.max_ping_count > 1000 {
            return Err(AppError::config("Max ping count cannot exceed 1000"));
        }

        if self.ping_timeout_secs == 0 {
            return Err(AppError::config("Ping timeout must be greater than 0"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("SPEEDTEST_BIND") {
            self.bind_address = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_API_PATH") {
            self.api_path = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_DOWNLOAD_PATH") {
            self.download_path = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_UPLOAD_PATH") {
            self.upload_path = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_PING_PATH") {
            self.ping_path = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_IP_PATH") {
            self.ip_echo_path = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_TIMEOUT") {
            self.default_timeout_secs = parse_env("SPEEDTEST_TIMEOUT", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_PING_COUNT") {
            self.default_ping_count = parse_env("SPEEDTEST_PING_COUNT", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_MAX_PING_COUNT") {
            self.max_ping_count = parse_env("SPEEDTEST_MAX_PING_COUNT", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_UPLOAD_SIZE") {
            self.upload_size_bytes = parse_env("SPEEDTEST_UPLOAD_SIZE", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_PING_INTERVAL_MS") {
            self.ping_interval_ms = parse_env("SPEEDTEST_PING_INTERVAL_MS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_PING_TIMEOUT") {
            self.ping_timeout_secs = parse_env("SPEEDTEST_PING_TIMEOUT", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_VERIFY_TLS") {
            self.verify_tls_certificates = parse_env("SPEEDTEST_VERIFY_TLS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_ASSUME_HTTPS") {
            self.assume_https = parse_env("SPEEDTEST_ASSUME_HTTPS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_SERVE_HELPERS") {
            self.serve_helpers = parse_env("SPEEDTEST_SERVE_HELPERS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_REPORT_IP") {
            self.report_client_ip = parse_env("SPEEDTEST_REPORT_IP", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_LOG_LEVEL") {
            self.log_level = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("SPEEDTEST_LOG_FORMAT") {
            self.log_format = parse_env("SPEEDTEST_LOG_FORMAT", &value)?;
        }

        Ok(())
    }
}

/// Reject paths the router would read as captures or wildcards
fn check_route_syntax(name: &str, path: &str) -> Result<()> {
    let dynamic = path.contains(['{', '}'])
        || path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'));

    if dynamic {
        return Err(AppError::config(format!(
            "{} must be a literal path without captures or wildcards: {}",
            name, path
        )));
    }
    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn default_bind_address() -> String {
    defaults::DEFAULT_BIND_ADDRESS.to_string()
}

fn default_api_path() -> String {
    defaults::DEFAULT_API_PATH.to_string()
}

fn default_download_path() -> String {
    defaults::DEFAULT_DOWNLOAD_PATH.to_string()
}

fn default_upload_path() -> String {
    defaults::DEFAULT_UPLOAD_PATH.to_string()
}

fn default_ping_path() -> String {
    defaults::DEFAULT_PING_PATH.to_string()
}

fn default_ip_echo_path() -> String {
    defaults::DEFAULT_IP_ECHO_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    defaults::DEFAULT_TIMEOUT_SECS
}

fn default_ping_count() -> u32 {
    defaults::DEFAULT_PING_COUNT
}

fn default_max_ping_count() -> u32 {
    defaults::DEFAULT_MAX_PING_COUNT
}

fn default_upload_size_bytes() -> usize {
    defaults::DEFAULT_UPLOAD_SIZE_BYTES
}

fn default_ping_interval_ms() -> u64 {
    defaults::DEFAULT_PING_INTERVAL.as_millis() as u64
}

fn default_ping_timeout_secs() -> u64 {
    defaults::DEFAULT_PING_TIMEOUT.as_secs()
}

fn default_serve_helpers() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
