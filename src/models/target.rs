//! Target server resolution

use crate::defaults;
use crate::models::Config;

/// Per-target relative path overrides taken from request parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOverrides {
    pub download: Option<String>,
    pub upload: Option<String>,
    pub ping: Option<String>,
    pub ip_echo: Option<String>,
}

/// A server against which throughput and latency are measured
#[derive(Debug, Clone, PartialEq)]
pub struct ServerTarget {
    /// Display name reported back to the caller
    pub name: String,
    /// Absolute base URL, always ending in `/`
    pub base_url: String,
    pub download_path: String,
    pub upload_path: String,
    pub ping_path: String,
    pub ip_echo_path: String,
}

impl ServerTarget {
    /// Built-in target pointing at the host that received the request
    pub fn local(host: &str, secure: bool, config: &Config) -> Self {
        Self {
            name: defaults::LOCAL_SERVER_NAME.to_string(),
            base_url: normalize_base_url(&format!("//{}/", host), secure),
            download_path: config.download_path.clone(),
            upload_path: config.upload_path.clone(),
            ping_path: config.ping_path.clone(),
            ip_echo_path: config.ip_echo_path.clone(),
        }
    }

    /// Target built from a caller-supplied `server` parameter
    pub fn user_specified(
        server: &str,
        overrides: PathOverrides,
        secure: bool,
        config: &Config,
    ) -> Self {
        Self {
            name: defaults::USER_SERVER_NAME.to_string(),
            base_url: normalize_base_url(server, secure),
            download_path: overrides
                .download
                .unwrap_or_else(|| config.download_path.clone()),
            upload_path: overrides.upload.unwrap_or_else(|| config.upload_path.clone()),
            ping_path: overrides.ping.unwrap_or_else(|| config.ping_path.clone()),
            ip_echo_path: overrides
                .ip_echo
                .unwrap_or_else(|| config.ip_echo_path.clone()),
        }
    }

    pub fn download_url(&self) -> String {
        self.join(&self.download_path)
    }

    pub fn upload_url(&self) -> String {
        self.join(&self.upload_path)
    }

    pub fn ping_url(&self) -> String {
        self.join(&self.ping_path)
    }

    pub fn ip_echo_url(&self) -> String {
        self.join(&self.ip_echo_path)
    }

    // Plain concatenation: paths are relative to the base by contract.
    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Prefix a protocol-relative `//host` value with the scheme of the inbound
/// request and make sure the result ends in `/`.
pub fn normalize_base_url(raw: &str, secure: bool) -> String {
    let mut url = if raw.starts_with("//") {
        let scheme = if secure { "https:" } else { "http:" };
        format!("{}{}", scheme, raw)
    } else {
        raw.to_string()
    };

    if !url.ends_with('/') {
        url.push('/');
    }

    url
}
