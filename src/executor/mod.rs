//! Speed test orchestration
//!
//! [`SpeedTestOrchestrator`] takes a resolved [`SpeedTestRequest`], runs the
//! sub-tests selected by the mode against each target strictly one after
//! another (download, then upload, then ping) and assembles the report.

pub mod measurements;

#[cfg(test)]
pub(crate) mod test_support;

pub use measurements::{download_test, ping_test, upload_test};

use crate::{
    client::SpeedClient,
    models::{ApiResponse, Config, ServerReport, ServerTarget},
    types::TestMode,
};
use std::sync::Arc;
use std::time::Duration;

/// A fully resolved request: targets plus coerced parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedTestRequest {
    pub targets: Vec<ServerTarget>,
    pub mode: TestMode,
    /// Download/upload limit; zero disables it
    pub timeout: Duration,
    pub ping_count: u32,
}

/// Server-wide measurement settings
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSettings {
    pub upload_size_bytes: usize,
    pub ping_interval: Duration,
    /// Cap on each ping call; the request timeout never applies to pings
    pub ping_timeout: Duration,
    pub report_client_ip: bool,
}

impl MeasurementSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_size_bytes: config.upload_size_bytes,
            ping_interval: config.ping_interval(),
            ping_timeout: config.ping_timeout(),
            report_client_ip: config.report_client_ip,
        }
    }
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs the requested measurements and builds the API response
#[derive(Clone)]
pub struct SpeedTestOrchestrator {
    client: Arc<dyn SpeedClient>,
    settings: MeasurementSettings,
}

impl SpeedTestOrchestrator {
    pub fn new(client: Arc<dyn SpeedClient>, settings: MeasurementSettings) -> Self {
        Self { client, settings }
    }

    /// Test every target in order and stamp the result
    pub async fn run(&self, request: &SpeedTestRequest) -> ApiResponse {
        let mut servers = Vec::with_capacity(request.targets.len());

        for target in &request.targets {
            servers.push(self.test_target(target, request).await);
        }

        ApiResponse::now(servers)
    }

    /// Run the mode-selected sub-tests against one target
    pub async fn test_target(&self, target: &ServerTarget, request: &SpeedTestRequest) -> ServerReport {
        let client = self.client.as_ref();
        let mut report = ServerReport::new(&target.name, &target.base_url);

        tracing::debug!(
            target_name = %target.name,
            url = %target.base_url,
            mode = %request.mode,
            "testing target"
        );

        if request.mode.runs_download() {
            let result = download_test(client, &target.download_url(), request.timeout).await;
            tracing::info!(
                url = %target.base_url,
                speed_mbps = result.speed_mbps,
                time_ms = result.elapsed_ms,
                "download measured"
            );
            report.download = Some(result);
        }

        if request.mode.runs_upload() {
            let result = upload_test(
                client,
                &target.upload_url(),
                self.settings.upload_size_bytes,
                request.timeout,
            )
            .await;
            tracing::info!(
                url = %target.base_url,
                speed_mbps = result.speed_mbps,
                time_ms = result.elapsed_ms,
                "upload measured"
            );
            report.upload = Some(result);
        }

        if request.mode.runs_ping() {
            let result = ping_test(
                client,
                &target.ping_url(),
                request.ping_count,
                self.settings.ping_interval,
                Some(self.settings.ping_timeout),
            )
            .await;
            tracing::info!(
                url = %target.base_url,
                ping_ms = result.average_ping_ms,
                jitter_ms = result.jitter_ms,
                samples = request.ping_count,
                "ping measured"
            );
            report.ping = Some(result);
        }

        if self.settings.report_client_ip {
            report.ip = Some(self.client_ip(target).await);
        }

        report
    }

    /// Ask the target's IP echo endpoint who we are; empty on failure
    async fn client_ip(&self, target: &ServerTarget) -> String {
        let transfer = self
            .client
            .get(&target.ip_echo_url(), Some(self.settings.ping_timeout))
            .await;
        String::from_utf8_lossy(&transfer.body).trim().to_string()
    }
}
