//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        // Start with default configuration
        let mut config = Config::default();

        // Load from environment file if it exists
        config.env_file = self.load_env_file()?;

        // Merge environment variables into config
        config.merge_from_env()?;

        // Override with CLI arguments
        self.apply_cli_overrides(&mut config);

        // Validate the final configuration
        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<Option<PathBuf>> {
        match &self.cli.env_file {
            Some(path) => EnvManager::load_from(path).map(Some),
            None => EnvManager::load_env_file(),
        }
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ref bind) = cli.bind {
            config.bind_address = bind.clone();
        }

        if let Some(ref api_path) = cli.api_path {
            config.api_path = api_path.clone();
        }

        if let Some(timeout) = cli.timeout {
            config.default_timeout_secs = timeout;
        }

        if let Some(count) = cli.ping_count {
            config.default_ping_count = count;
        }

        // Switches only ever turn their behaviour on
        if cli.verify_tls {
            config.verify_tls_certificates = true;
        }

        if cli.assume_https {
            config.assume_https = true;
        }

        if cli.no_helpers {
            config.serve_helpers = false;
        }

        if cli.report_ip {
            config.report_client_ip = true;
        }

        if let Some(ref level) = cli.log_level {
            config.log_level = level.clone();
        }

        if let Some(format) = cli.log_format {
            config.log_format = format;
        }

        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for startup logs
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Bind Address: {}", config.bind_address),
        format!("API Path: {}", config.api_path),
        format!(
            "Target Paths: download={} upload={} ping={} ip={}",
            config.download_path, config.upload_path, config.ping_path, config.ip_echo_path
        ),
        format!("Default Timeout: {}s", config.default_timeout_secs),
        format!(
            "Default Ping Count: {} (max {})",
            config.default_ping_count, config.max_ping_count
        ),
        format!("Upload Size: {} bytes", config.upload_size_bytes),
        format!(
            "Ping Interval: {}ms, Ping Timeout: {}s",
            config.ping_interval_ms, config.ping_timeout_secs
        ),
        format!("Verify TLS: {}", config.verify_tls_certificates),
        format!("Assume HTTPS: {}", config.assume_https),
        format!("Serve Helpers: {}", config.serve_helpers),
        format!("Report Client IP: {}", config.report_client_ip),
        format!("Log: {} ({})", config.log_level, config.log_format),
        format!(
            "Env File: {}",
            config
                .env_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
    ];

    summary.join("\n")
}
