//! Individual download, upload and ping measurements

use crate::{
    client::SpeedClient,
    defaults,
    models::{PingResult, TestResult},
    stats,
};
use bytes::Bytes;
use std::time::Duration;

/// Time one GET and derive the download speed from the bytes received.
///
/// The limit is applied to the whole transfer; `Duration::ZERO` disables it.
pub async fn download_test(client: &dyn SpeedClient, url: &str, limit: Duration) -> TestResult {
    let transfer = client.get(url, Some(limit)).await;
    throughput(transfer.bytes_received(), transfer.elapsed)
}

/// Time one POST of `size_bytes` filler bytes.
///
/// Speed is computed from the payload size, never from the response.
pub async fn upload_test(
    client: &dyn SpeedClient,
    url: &str,
    size_bytes: usize,
    limit: Duration,
) -> TestResult {
    let payload = upload_payload(size_bytes);
    let transfer = client.post(url, payload, Some(limit)).await;
    throughput(size_bytes as u64, transfer.elapsed)
}

/// Filler payload for upload tests
pub fn upload_payload(size_bytes: usize) -> Bytes {
    Bytes::from(vec![defaults::UPLOAD_FILLER; size_bytes])
}

/// Collect `count` sequential round-trip samples in milliseconds.
///
/// Failed requests are recorded like any other sample. `interval` is slept
/// after every request, the last one included.
pub async fn collect_ping_samples(
    client: &dyn SpeedClient,
    url: &str,
    count: u32,
    interval: Duration,
    per_call_limit: Option<Duration>,
) -> Vec<f64> {
    let mut samples = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let transfer = client.get(url, per_call_limit).await;
        samples.push(stats::duration_ms(transfer.elapsed));
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }

    samples
}

/// Average and jitter of a sample set, both rounded to 2 decimals
pub fn summarize_pings(samples: &[f64]) -> PingResult {
    PingResult {
        average_ping_ms: stats::round2(stats::mean(samples)),
        jitter_ms: stats::round2(stats::jitter(samples)),
    }
}

pub async fn ping_test(
    client: &dyn SpeedClient,
    url: &str,
    count: u32,
    interval: Duration,
    per_call_limit: Option<Duration>,
) -> PingResult {
    let samples = collect_ping_samples(client, url, count, interval, per_call_limit).await;
    tracing::trace!(url, ?samples, "ping samples");
    summarize_pings(&samples)
}

fn throughput(bytes: u64, elapsed: Duration) -> TestResult {
    TestResult {
        speed_mbps: stats::speed_mbps(bytes, elapsed),
        elapsed_ms: stats::elapsed_ms(elapsed),
    }
}
