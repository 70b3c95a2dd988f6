//! Base URI that resolved paths are prefixed with
//!
//! When building links while serving a request, the base should reflect how
//! the client reached the server, including any reverse proxy in between.

use crate::core::error::{HateoasError, Result};
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::http::request::Parts;
use std::fmt;
use url::Url;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PORT: &str = "x-forwarded-port";
pub const X_FORWARDED_PREFIX: &str = "x-forwarded-prefix";

/// Absolute scheme + authority (+ optional path prefix), without trailing slash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUri(String);

impl BaseUri {
    /// Parse and validate an absolute base URI
    pub fn new(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|e| HateoasError::InvalidBaseUri {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;

        if !parsed.has_host() {
            return Err(HateoasError::InvalidBaseUri {
                uri: uri.to_string(),
                message: "missing host".to_string(),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(HateoasError::InvalidBaseUri {
                uri: uri.to_string(),
                message: "query and fragment are not allowed".to_string(),
            });
        }

        Ok(Self(parsed.as_str().trim_end_matches('/').to_string()))
    }

    /// `http://localhost`, used when nothing better is known
    pub fn localhost() -> Self {
        Self("http://localhost".to_string())
    }

    /// Derive the base URI from request headers
    ///
    /// `X-Forwarded-*` headers take precedence over `Host`, and
    /// `X-Forwarded-Port` replaces any port already on the host. Without any
    /// host information the result is [`BaseUri::localhost`]. Headers that do
    /// not form a valid URL are reported as [`HateoasError::MalformedHost`].
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let scheme = first_value(headers, X_FORWARDED_PROTO).unwrap_or("http");

        let Some(mut host) = first_value(headers, X_FORWARDED_HOST)
            .or_else(|| first_value(headers, HOST.as_str()))
            .map(str::to_string)
        else {
            return Ok(Self::localhost());
        };

        if let Some(port) = first_value(headers, X_FORWARDED_PORT) {
            let default_port = matches!((scheme, port), ("http", "80") | ("https", "443"));
            host = if default_port {
                strip_port(&host).to_string()
            } else {
                format!("{}:{}", strip_port(&host), port)
            };
        }

        let prefix = first_value(headers, X_FORWARDED_PREFIX)
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .map(|p| {
                if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{}", p)
                }
            })
            .unwrap_or_default();

        let uri = format!("{}://{}{}", scheme, host, prefix);
        Self::new(&uri).map_err(|err| match err {
            HateoasError::InvalidBaseUri { message, .. } => {
                HateoasError::MalformedHost { value: uri, message }
            }
            other => other,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix an absolute path with this base
    pub fn resolve(&self, path: &str) -> String {
        match path {
            "" | "/" => format!("{}/", self.0),
            p if p.starts_with('/') => format!("{}{}", self.0, p),
            p => format!("{}/{}", self.0, p),
        }
    }
}

impl Default for BaseUri {
    fn default() -> Self {
        Self::localhost()
    }
}

impl fmt::Display for BaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Host without its `:port` suffix (an empty port counts as a suffix)
fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        // IPv6 literals contain colons inside brackets
        Some((name, port)) if !port.contains(']') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

impl<S> FromRequestParts<S> for BaseUri
where
    S: Send + Sync,
{
    type Rejection = HateoasError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        BaseUri::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let base = BaseUri::new("https://api.example.com/v1/").unwrap();
        assert_eq!(base.as_str(), "https://api.example.com/v1");
    }

    #[test]
    fn test_new_rejects_relative_and_query() {
        assert!(BaseUri::new("/customers").is_err());
        assert!(BaseUri::new("http://example.com/?a=b").is_err());
        let err = BaseUri::new("not a url").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BASE_URI");
    }

    #[test]
    fn test_resolve_joins_paths() {
        let base = BaseUri::localhost();
        assert_eq!(base.resolve("/customers/15"), "http://localhost/customers/15");
        assert_eq!(base.resolve("customers"), "http://localhost/customers");
        assert_eq!(base.resolve("/"), "http://localhost/");
    }

    #[test]
    fn test_from_headers_without_host_is_localhost() {
        let base = BaseUri::from_headers(&HeaderMap::new()).unwrap();
        assert_eq!(base, BaseUri::localhost());
    }

    #[test]
    fn test_from_headers_uses_host() {
        let base = BaseUri::from_headers(&headers(&[("host", "example.com:8080")])).unwrap();
        assert_eq!(base.as_str(), "http://example.com:8080");
    }

    #[test]
    fn test_forwarded_headers_take_precedence() {
        let base = BaseUri::from_headers(&headers(&[
            ("host", "internal:8080"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "api.example.com, proxy.local"),
            ("x-forwarded-port", "8443"),
            ("x-forwarded-prefix", "/shop/"),
        ]))
        .unwrap();
        assert_eq!(base.as_str(), "https://api.example.com:8443/shop");
    }

    #[test]
    fn test_default_port_is_omitted() {
        let base = BaseUri::from_headers(&headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "api.example.com"),
            ("x-forwarded-port", "443"),
        ]))
        .unwrap();
        assert_eq!(base.as_str(), "https://api.example.com");
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:80"), "example.com");
        assert_eq!(strip_port("example.com:"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]"), "[::1]");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
    }

    #[test]
    fn test_new_stores_normalized_url() {
        let base = BaseUri::new("HTTP://Bücher.example/v1").unwrap();
        assert_eq!(base.as_str(), "http://xn--bcher-kva.example/v1");

        let base = BaseUri::new("http://example.com:80/").unwrap();
        assert_eq!(base.as_str(), "http://example.com");
    }

    #[test]
    fn test_forwarded_prefix_is_encoded() {
        let base = BaseUri::from_headers(&headers(&[
            ("host", "example.com"),
            ("x-forwarded-prefix", "/my shop"),
        ]))
        .unwrap();
        assert_eq!(base.as_str(), "http://example.com/my%20shop");
        assert_eq!(base.resolve("/customers"), "http://example.com/my%20shop/customers");
    }

    #[test]
    fn test_forwarded_port_replaces_host_port() {
        let base = BaseUri::from_headers(&headers(&[
            ("x-forwarded-host", "api.example.com:8080"),
            ("x-forwarded-port", "9090"),
        ]))
        .unwrap();
        assert_eq!(base.as_str(), "http://api.example.com:9090");

        let base = BaseUri::from_headers(&headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "api.example.com:8443"),
            ("x-forwarded-port", "443"),
        ]))
        .unwrap();
        assert_eq!(base.as_str(), "https://api.example.com");
    }

    #[test]
    fn test_malformed_host_is_a_client_error() {
        let err = BaseUri::from_headers(&headers(&[("host", "bad host")])).unwrap_err();
        assert!(matches!(err, HateoasError::MalformedHost { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err = BaseUri::new("http://bad host").unwrap_err();
        assert!(matches!(err, HateoasError::InvalidBaseUri { .. }));
    }
}
