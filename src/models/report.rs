//! Measurement results and the JSON report

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp layout of [`ApiResponse::timestamp`]
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Throughput measurement for a download or upload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Megabits per second, 2 decimals
    #[serde(rename = "speed")]
    pub speed_mbps: f64,
    /// Elapsed wall-clock milliseconds, 2 decimals
    #[serde(rename = "time")]
    pub elapsed_ms: f64,
}

/// Latency measurement derived from round-trip samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    #[serde(rename = "ping")]
    pub average_ping_ms: f64,
    #[serde(rename = "jitter")]
    pub jitter_ms: f64,
}

/// Results for one tested target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerReport {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<TestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<TestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingResult>,
    /// Client address as echoed by the target, when IP reporting is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl ServerReport {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            download: None,
            upload: None,
            ping: None,
            ip: None,
        }
    }
}

/// Top-level document returned by the endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub timestamp: String,
    pub servers: Vec<ServerReport>,
}

impl ApiResponse {
    /// Stamp `servers` with the current local time
    pub fn now(servers: Vec<ServerReport>) -> Self {
        Self::at(Local::now(), servers)
    }

    pub fn at(time: DateTime<Local>, servers: Vec<ServerReport>) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            servers,
        }
    }

    /// Pretty-printed JSON body
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
