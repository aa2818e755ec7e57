//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `./.env` if it exists, returning the path that was loaded
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        let path = Path::new(".env");
        if path.exists() {
            Self::load_from(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Load an explicitly named env file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<PathBuf> {
        dotenv::from_path(path).map_err(|e| {
            AppError::config(format!("Failed to load env file {}: {}", path.display(), e))
        })?;

        Ok(path.to_path_buf())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Speedtest API Configuration
#
# Values here are used as defaults and can be overridden by command-line
# arguments.

# Listen address
# SPEEDTEST_BIND=0.0.0.0:8080

# Route serving the JSON report
# SPEEDTEST_API_PATH=/speedtest

# Relative paths of the collaborator endpoints on every target
# SPEEDTEST_DOWNLOAD_PATH=backend/garbage.php
# SPEEDTEST_UPLOAD_PATH=backend/empty.php
# SPEEDTEST_PING_PATH=backend/empty.php
# SPEEDTEST_IP_PATH=backend/getIP.php

# Request defaults
# SPEEDTEST_TIMEOUT=5
# SPEEDTEST_PING_COUNT=3
# SPEEDTEST_MAX_PING_COUNT=100

# Measurement tuning
# SPEEDTEST_UPLOAD_SIZE=1000000
# SPEEDTEST_PING_INTERVAL_MS=100
# SPEEDTEST_PING_TIMEOUT=30

# TLS verification of measured targets is OFF unless enabled here
# SPEEDTEST_VERIFY_TLS=false

# Behind a TLS-terminating proxy that does not send X-Forwarded-Proto
# SPEEDTEST_ASSUME_HTTPS=false

# Built-in garbage/empty/getIP routes
# SPEEDTEST_SERVE_HELPERS=true

# Add the client IP echoed by each target to the report
# SPEEDTEST_REPORT_IP=false

# Logging
# SPEEDTEST_LOG_LEVEL=info
# SPEEDTEST_LOG_FORMAT=console
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content()).map_err(|e| {
            AppError::config(format!("Failed to write example .env file: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_example_content_mentions_every_variable() {
        let content = EnvManager::create_example_env_content();
        for key in [
            "SPEEDTEST_BIND",
            "SPEEDTEST_API_PATH",
            "SPEEDTEST_DOWNLOAD_PATH",
            "SPEEDTEST_UPLOAD_PATH",
            "SPEEDTEST_PING_PATH",
            "SPEEDTEST_IP_PATH",
            "SPEEDTEST_TIMEOUT",
            "SPEEDTEST_PING_COUNT",
            "SPEEDTEST_MAX_PING_COUNT",
            "SPEEDTEST_UPLOAD_SIZE",
            "SPEEDTEST_PING_INTERVAL_MS",
            "SPEEDTEST_PING_TIMEOUT",
            "SPEEDTEST_VERIFY_TLS",
            "SPEEDTEST_ASSUME_HTTPS",
            "SPEEDTEST_SERVE_HELPERS",
            "SPEEDTEST_REPORT_IP",
            "SPEEDTEST_LOG_LEVEL",
            "SPEEDTEST_LOG_FORMAT",
        ] {
            assert!(content.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_save_example_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env.example");
        EnvManager::save_example_env_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, EnvManager::create_example_env_content());
    }

    #[test]
    fn test_load_from_returns_loaded_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quiet.env");
        std::fs::write(&path, "# nothing set\n").unwrap();

        assert_eq!(EnvManager::load_from(&path).unwrap(), path);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = EnvManager::load_from(&dir.path().join("nope.env"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
