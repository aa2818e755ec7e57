//! Data models and structures for the speedtest API

pub mod config;
pub mod report;
pub mod target;

// Re-export main model types
pub use config::Config;
pub use report::{ApiResponse, PingResult, ServerReport, TestResult};
pub use target::{PathOverrides, ServerTarget};
