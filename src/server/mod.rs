//! HTTP server and API endpoint
//!
//! One report route (GET or POST, default `/speedtest`) plus the optional
//! helper routes. The report route always answers 200 with pretty JSON;
//! measurement failures only show up as degenerate numbers in the body.

pub mod helpers;
pub mod params;

use crate::{
    client::NetworkClient,
    error::{AppError, Result},
    executor::{MeasurementSettings, SpeedTestOrchestrator},
    models::Config,
};
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use bytes::Bytes;
use params::{parse_query, resolve_request, RequestContext};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Instrument;
use uuid::Uuid;

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0, s-maxage=0";
const NO_CACHE_LEGACY: &str = "post-check=0, pre-check=0";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: SpeedTestOrchestrator,
    pub config: Arc<Config>,
    /// Payload chunk served by the garbage helper
    pub garbage_chunk: Bytes,
}

impl AppState {
    pub fn new(orchestrator: SpeedTestOrchestrator, config: Config) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
            garbage_chunk: helpers::random_chunk(crate::defaults::GARBAGE_CHUNK_BYTES),
        }
    }

    /// State backed by the real reqwest client
    pub fn from_config(config: Config) -> Result<Self> {
        let client = NetworkClient::from_config(&config)?;
        let orchestrator =
            SpeedTestOrchestrator::new(Arc::new(client), MeasurementSettings::from_config(&config));
        Ok(Self::new(orchestrator, config))
    }
}

/// Headers that keep browsers and proxies from caching a response
pub fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.append(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_LEGACY));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Wide-open CORS for GET and POST
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_ENCODING, header::CONTENT_TYPE])
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let mut app = Router::new().route(&config.api_path, get(speedtest).post(speedtest));

    if config.serve_helpers {
        for (path, route) in helper_routes(&config) {
            app = app.route(&path, route);
        }
    }

    app.layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Helper routes keyed by absolute path. Upload and ping share the empty
/// sink by default, so identical paths are registered once.
fn helper_routes(config: &Config) -> BTreeMap<String, MethodRouter<AppState>> {
    let mut routes = BTreeMap::new();
    for path in [&config.upload_path, &config.ping_path] {
        routes.insert(format!("/{}", path), get(helpers::empty).post(helpers::empty));
    }
    routes.insert(format!("/{}", config.download_path), get(helpers::garbage));
    routes.insert(format!("/{}", config.ip_echo_path), get(helpers::get_ip));
    routes
}

/// The speedtest report endpoint
pub async fn speedtest(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let span = tracing::info_span!("speedtest", request_id = %Uuid::new_v4());

    async move {
        let query = parse_query(raw_query.as_deref());
        let context = RequestContext::from_parts(&headers, &uri, &state.config);
        let request = resolve_request(&query, &context, &state.config);

        tracing::info!(
            mode = %request.mode,
            targets = request.targets.len(),
            timeout_secs = request.timeout.as_secs(),
            ping_count = request.ping_count,
            "speedtest started"
        );

        let report = state.orchestrator.run(&request).await;
        json_response(report.to_pretty_json())
    }
    .instrument(span)
    .await
}

fn json_response(body: serde_json::Result<String>) -> Response {
    let body = body.unwrap_or_else(|e| {
        // Plain data structs; serialization cannot realistically fail
        tracing::error!(error = %e, "failed to serialize report");
        "{}".to_string()
    });

    let mut headers = no_cache_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, POST"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("Content-Encoding, Content-Type"),
    );

    (StatusCode::OK, headers, body).into_response()
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    if !config.verify_tls_certificates {
        tracing::warn!(
            "TLS certificate and host name verification of measured targets is DISABLED; \
             set SPEEDTEST_VERIFY_TLS=true or pass --verify-tls to enable it"
        );
    }

    let state = AppState::from_config(config)?;
    let api_path = state.config.api_path.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::io(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(%addr, api_path = %api_path, "speedtest API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::server(format!("Server terminated: {}", e)))?;

    tracing::info!("speedtest API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
