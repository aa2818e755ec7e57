//! Command-line interface

use crate::logging::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Speedtest API - measure download, upload, ping and jitter against target servers
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "speedtest-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on (e.g. 0.0.0.0:8080)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Route serving the speedtest report
    #[arg(long, value_name = "PATH")]
    pub api_path: Option<String>,

    /// Default download/upload timeout in seconds when a request omits `timeout`
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Default number of ping samples when a request omits `pingCount`
    #[arg(short = 'c', long, value_name = "COUNT")]
    pub ping_count: Option<u32>,

    /// Verify TLS certificates of measured targets (off by default)
    #[arg(long)]
    pub verify_tls: bool,

    /// Treat inbound requests as HTTPS when inferring target schemes
    #[arg(long)]
    pub assume_https: bool,

    /// Do not serve the built-in garbage/empty/getIP helper routes
    #[arg(long)]
    pub no_helpers: bool,

    /// Report the client IP echoed by each target
    #[arg(long)]
    pub report_ip: bool,

    /// Log level or tracing filter directive
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format: console, compact or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Environment file to load instead of ./.env
    #[arg(long, value_name = "FILE", env = "SPEEDTEST_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Write a commented example environment file and exit
    #[arg(long, value_name = "FILE")]
    pub write_env_example: Option<PathBuf>,
}
