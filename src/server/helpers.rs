//! Built-in collaborator endpoints
//!
//! The default "Local Server" target points back at this service, so when
//! `serve_helpers` is on we answer its download, upload/ping and IP echo
//! paths ourselves.

use crate::{
    defaults,
    server::{no_cache_headers, AppState},
    types::coerce_count,
};
use axum::{
    body::Body,
    extract::{ConnectInfo, RawQuery, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::StreamExt;
use rand::RngCore;
use std::convert::Infallible;
use std::net::SocketAddr;

/// One chunk of random bytes, generated once per process
pub fn random_chunk(size: usize) -> Bytes {
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);
    Bytes::from(buf)
}

/// Number of chunks requested through `ckSize`
pub fn chunk_count(raw_query: Option<&str>) -> u32 {
    let query = super::params::parse_query(raw_query);
    match query.get("ckSize") {
        Some(value) => coerce_count(value, defaults::GARBAGE_MAX_CHUNKS),
        None => defaults::GARBAGE_DEFAULT_CHUNKS,
    }
}

/// Stream `ckSize` chunks of incompressible data
pub async fn garbage(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let chunks = chunk_count(query.as_deref());
    let chunk = state.garbage_chunk.clone();
    let content_length = chunk.len() as u64 * u64::from(chunks);

    let stream = futures::stream::iter((0..chunks).map(move |_| Ok::<_, Infallible>(chunk.clone())));

    let mut headers = no_cache_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=random.dat"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));

    (StatusCode::OK, headers, Body::from_stream(stream)).into_response()
}

/// Drain whatever the caller sent and answer with an empty body
pub async fn empty(request: Request) -> Response {
    let mut stream = request.into_body().into_data_stream();
    let mut drained: usize = 0;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => drained += bytes.len(),
            Err(e) => {
                tracing::debug!(error = %e, "upload body ended early");
                break;
            }
        }
    }
    tracing::trace!(bytes = drained, "drained request body");

    let mut headers = no_cache_headers();
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (StatusCode::OK, headers).into_response()
}

/// Echo the caller's address as plain text
pub async fn get_ip(request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    let mut headers = no_cache_headers();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    (StatusCode::OK, headers, ip).into_response()
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default()
}
