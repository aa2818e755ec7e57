//! HTTP client wrapper and transfer timing
//!
//! Every measurement goes through [`SpeedClient`]. The wrapper owns the
//! suppress-and-degrade policy: a transport failure (DNS, refused connection,
//! timeout, TLS) never becomes an `Err` for the caller. It yields a
//! [`Transfer`] with an empty body and the wall-clock time that was spent
//! before the failure, and the error is kept on the transfer for logging.

use crate::{
    error::{AppError, Result},
    models::Config,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect, Client};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// HTTP client trait for abstraction and testing
#[async_trait]
pub trait SpeedClient: Send + Sync {
    /// Timed GET; the whole response body is read into memory
    async fn get(&self, url: &str, limit: Option<Duration>) -> Transfer;

    /// Timed POST of `body`; the response body is read and discarded
    async fn post(&self, url: &str, body: Bytes, limit: Option<Duration>) -> Transfer;
}

/// Outcome of a single timed HTTP call
#[derive(Debug)]
pub struct Transfer {
    /// Response body, empty when the call failed
    pub body: Bytes,
    /// Wall-clock time around the whole call
    pub elapsed: Duration,
    /// HTTP status, if a response arrived
    pub status: Option<u16>,
    /// Swallowed transport error, if any
    pub error: Option<AppError>,
}

impl Transfer {
    pub fn completed(body: Bytes, elapsed: Duration, status: u16) -> Self {
        Self {
            body,
            elapsed,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(error: AppError, elapsed: Duration) -> Self {
        Self {
            body: Bytes::new(),
            elapsed,
            status: None,
            error: Some(error),
        }
    }

    /// Bytes received in the response body
    pub fn bytes_received(&self) -> u64 {
        self.body.len() as u64
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Client settings derived from [`Config`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// When false, certificate and host name checks are skipped
    pub verify_tls_certificates: bool,
    pub user_agent: String,
}

impl ClientOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            verify_tls_certificates: config.verify_tls_certificates,
            ..Self::default()
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_tls_certificates: false,
            user_agent: format!("{}/{}", crate::PKG_NAME, crate::VERSION),
        }
    }
}

/// reqwest-backed [`SpeedClient`]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    /// Create a new network client.
    ///
    /// Connection pooling is disabled so that every measured call pays for
    /// its own connection setup, and redirects are not followed so a
    /// redirecting target is measured as-is.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!options.verify_tls_certificates)
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&ClientOptions::from_config(config))
    }

    async fn execute(&self, request: reqwest::RequestBuilder, limit: Option<Duration>) -> Transfer {
        let start = Instant::now();

        let call = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        // A zero limit means "no limit"
        let outcome = match limit.filter(|d| !d.is_zero()) {
            Some(limit) => match timeout(limit, call).await {
                Ok(result) => result.map_err(AppError::from),
                Err(_) => Err(AppError::timeout(format!(
                    "Transfer exceeded {:.3}s",
                    limit.as_secs_f64()
                ))),
            },
            None => call.await.map_err(AppError::from),
        };

        let elapsed = start.elapsed();

        match outcome {
            Ok((status, body)) => Transfer::completed(body, elapsed, status),
            Err(error) => Transfer::failed(error, elapsed),
        }
    }
}

#[async_trait]
impl SpeedClient for NetworkClient {
    async fn get(&self, url: &str, limit: Option<Duration>) -> Transfer {
        // An unparsable URL fails immediately, just like a refused connection.
        let request = self.client.get(url);
        let transfer = self.execute(request, limit).await;
        log_transfer("GET", url, &transfer);
        transfer
    }

    async fn post(&self, url: &str, body: Bytes, limit: Option<Duration>) -> Transfer {
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        let transfer = self.execute(request, limit).await;
        log_transfer("POST", url, &transfer);
        transfer
    }
}

fn log_transfer(method: &str, url: &str, transfer: &Transfer) {
    match &transfer.error {
        None => tracing::debug!(
            method,
            url,
            status = transfer.status,
            bytes = transfer.bytes_received(),
            elapsed_ms = crate::stats::duration_ms(transfer.elapsed),
            "transfer completed"
        ),
        Some(error) if error.is_recoverable() => tracing::debug!(
            method,
            url,
            category = error.category(),
            error = %error,
            elapsed_ms = crate::stats::duration_ms(transfer.elapsed),
            "transfer failed, reporting degraded result"
        ),
        Some(error) => tracing::warn!(
            method,
            url,
            category = error.category(),
            error = %error,
            "unexpected transfer failure, reporting degraded result"
        ),
    }
}
