//! Speedtest API
//!
//! An HTTP endpoint that measures download throughput, upload throughput,
//! ping and jitter against one or more target servers and returns the
//! results as a pretty-printed JSON report.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod server;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::SpeedTestOrchestrator;
pub use models::{ApiResponse, Config, PingResult, ServerReport, ServerTarget, TestResult};
pub use types::TestMode;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
    pub const DEFAULT_API_PATH: &str = "/speedtest";

    pub const DEFAULT_DOWNLOAD_PATH: &str = "backend/garbage.php";
    pub const DEFAULT_UPLOAD_PATH: &str = "backend/empty.php";
    pub const DEFAULT_PING_PATH: &str = "backend/empty.php";
    pub const DEFAULT_IP_ECHO_PATH: &str = "backend/getIP.php";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
    pub const DEFAULT_PING_COUNT: u32 = 3;
    pub const DEFAULT_MAX_PING_COUNT: u32 = 100;
    pub const DEFAULT_UPLOAD_SIZE_BYTES: usize = 1_000_000;
    pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(30);

    pub const LOCAL_SERVER_NAME: &str = "Local Server";
    pub const USER_SERVER_NAME: &str = "User Specified Server";

    /// Byte used to fill upload payloads
    pub const UPLOAD_FILLER: u8 = b'x';

    /// Garbage endpoint chunking
    pub const GARBAGE_CHUNK_BYTES: usize = 1024 * 1024;
    pub const GARBAGE_DEFAULT_CHUNKS: u32 = 4;
    pub const GARBAGE_MAX_CHUNKS: u32 = 1024;
}
