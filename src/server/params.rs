//! Query parameter resolution
//!
//! Turns the raw query string of an API call into a [`SpeedTestRequest`].
//! Nothing here can fail: unknown parameters are ignored, malformed integers
//! coerce to 0 and an unknown mode simply selects no sub-test.

use crate::{
    executor::SpeedTestRequest,
    models::{Config, PathOverrides, ServerTarget},
    types::{coerce_count, coerce_non_negative, TestMode},
};
use axum::http::{header, HeaderMap, Uri};
use std::collections::HashMap;
use std::time::Duration;

/// What the orchestrator needs to know about the inbound request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Host (and port) the caller addressed
    pub host: String,
    /// Whether the caller reached us over HTTPS
    pub secure: bool,
}

impl RequestContext {
    /// Derive host and scheme from request headers.
    ///
    /// The `Host` header wins, then the URI authority (HTTP/2), then the
    /// configured bind address. A request counts as secure when
    /// `assume_https` is set or a proxy sent `X-Forwarded-Proto: https`.
    pub fn from_parts(headers: &HeaderMap, uri: &Uri, config: &Config) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| config.bind_address.clone());

        let forwarded_https = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
            .unwrap_or(false);

        let secure = config.assume_https || forwarded_https || uri.scheme_str() == Some("https");

        Self { host, secure }
    }
}

/// Decode a raw query string; later duplicates overwrite earlier ones
pub fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.map(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Resolve targets and coerce parameters
pub fn resolve_request(
    query: &HashMap<String, String>,
    context: &RequestContext,
    config: &Config,
) -> SpeedTestRequest {
    let targets = match query.get("server") {
        Some(server) => {
            let overrides = PathOverrides {
                download: query.get("dlURL").cloned(),
                upload: query.get("ulURL").cloned(),
                ping: query.get("pingURL").cloned(),
                ip_echo: query.get("getIpURL").cloned(),
            };
            vec![ServerTarget::user_specified(
                server,
                overrides,
                context.secure,
                config,
            )]
        }
        None => vec![ServerTarget::local(&context.host, context.secure, config)],
    };

    let mode = query
        .get("mode")
        .map(|m| TestMode::from_param(m))
        .unwrap_or_default();

    let timeout_secs = query
        .get("timeout")
        .map(|t| coerce_non_negative(t))
        .unwrap_or(config.default_timeout_secs);

    let ping_count = query
        .get("pingCount")
        .map(|c| coerce_count(c, config.max_ping_count))
        .unwrap_or_else(|| config.default_ping_count.min(config.max_ping_count));

    SpeedTestRequest {
        targets,
        mode,
        timeout: Duration::from_secs(timeout_secs),
        ping_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(secure: bool) -> RequestContext {
        RequestContext {
            host: "speed.local:8080".to_string(),
            secure,
        }
    }

    #[test]
    fn test_parse_query_decodes_and_overwrites() {
        let query = parse_query(Some("server=%2F%2Fexample.com&mode=ping&mode=upload"));
        assert_eq!(query.get("server").map(String::as_str), Some("//example.com"));
        assert_eq!(query.get("mode").map(String::as_str), Some("upload"));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_defaults_without_parameters() {
        let config = Config::default();
        let request = resolve_request(&HashMap::new(), &context(false), &config);

        assert_eq!(request.mode, TestMode::All);
        assert_eq!(request.timeout, Duration::from_secs(5));
        assert_eq!(request.ping_count, 3);
        assert_eq!(request.targets.len(), 1);
        assert_eq!(request.targets[0].name, "Local Server");
        assert_eq!(request.targets[0].base_url, "http://speed.local:8080/");
    }

    #[test]
    fn test_server_override() {
        let config = Config::default();
        let query = parse_query(Some("server=//example.com&mode=download&timeout=2"));
        let request = resolve_request(&query, &context(true), &config);

        assert_eq!(request.targets.len(), 1);
        assert_eq!(request.targets[0].base_url, "https://example.com/");
        assert_eq!(request.mode, TestMode::Download);
        assert_eq!(request.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_path_overrides_need_server() {
        let config = Config::default();
        let query = parse_query(Some("dlURL=custom.bin"));
        let request = resolve_request(&query, &context(false), &config);
        assert_eq!(request.targets[0].download_path, "backend/garbage.php");

        let query = parse_query(Some("server=http://a.example&dlURL=custom.bin&getIpURL=ip.txt"));
        let request = resolve_request(&query, &context(false), &config);
        assert_eq!(request.targets[0].download_url(), "http://a.example/custom.bin");
        assert_eq!(request.targets[0].ip_echo_url(), "http://a.example/ip.txt");
    }

    #[test]
    fn test_malformed_integers_coerce() {
        let config = Config::default();
        let query = parse_query(Some("timeout=soon&pingCount=-4"));
        let request = resolve_request(&query, &context(false), &config);

        assert_eq!(request.timeout, Duration::ZERO);
        assert_eq!(request.ping_count, 0);
    }

    #[test]
    fn test_ping_count_is_clamped() {
        let config = Config::default();
        let query = parse_query(Some("pingCount=100000"));
        let request = resolve_request(&query, &context(false), &config);
        assert_eq!(request.ping_count, config.max_ping_count);
    }

    #[test]
    fn test_context_from_headers() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("api.example:9000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS, http"));
        let uri: Uri = "/speedtest".parse().unwrap();

        let ctx = RequestContext::from_parts(&headers, &uri, &config);
        assert_eq!(ctx.host, "api.example:9000");
        assert!(ctx.secure);
    }

    #[test]
    fn test_context_fallbacks() {
        let config = Config {
            assume_https: true,
            ..Config::default()
        };
        let uri: Uri = "/speedtest".parse().unwrap();
        let ctx = RequestContext::from_parts(&HeaderMap::new(), &uri, &config);

        assert_eq!(ctx.host, config.bind_address);
        assert!(ctx.secure);
    }
}
