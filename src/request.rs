//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;

/// Header set by nginx (`proxy_set_header X-Real-IP $remote_addr`).
pub const X_REAL_IP: &str = "x-real-ip";

/// Comma-separated proxy chain; the left-most entry is the originating client.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// An incoming HTTP request.
///
/// The server builds one per hyper request with the body already collected.
/// Tests build one with [`Request::builder`].
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl Request {
    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        remote_addr: SocketAddr,
    ) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            remote_addr: Some(remote_addr),
        }
    }

    /// Builder for requests that never touched a socket.
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            req: Self {
                method: Method::GET,
                path: "/".to_owned(),
                query: None,
                headers: HeaderMap::new(),
                body: Bytes::new(),
                params: HashMap::new(),
                remote_addr: None,
            },
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The peer address of the TCP connection, if there is one.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Values that are not visible ASCII read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Best guess at the originating client address.
    ///
    /// First non-empty wins: `X-Real-IP`, then the first entry of
    /// `X-Forwarded-For`, then the peer IP of the connection (without port).
    ///
    /// Only trust this behind a proxy that overwrites both headers. A client
    /// talking to the server directly can put anything in them.
    pub fn real_ip(&self) -> Option<String> {
        if let Some(ip) = self.non_empty_header(X_REAL_IP) {
            return Some(ip.to_owned());
        }

        let forwarded = self
            .non_empty_header(X_FORWARDED_FOR)
            .and_then(|chain| chain.split(',').map(str::trim).find(|ip| !ip.is_empty()));
        if let Some(ip) = forwarded {
            return Some(ip.to_owned());
        }

        self.remote_addr.map(|addr| addr.ip().to_string())
    }

    fn non_empty_header(&self, name: &str) -> Option<&str> {
        self.header(name).map(str::trim).filter(|v| !v.is_empty())
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`], mostly for exercising handlers and
/// middleware without a server. Defaults to `GET /`.
///
/// ```rust
/// use astor::Request;
///
/// let req = Request::builder()
///     .path("/users/42")
///     .header("x-real-ip", "203.0.113.7")
///     .remote_addr("10.0.0.2:51234".parse().unwrap())
///     .build();
///
/// assert_eq!(req.real_ip().as_deref(), Some("203.0.113.7"));
/// ```
pub struct RequestBuilder {
    req: Request,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.req.method = method;
        self
    }

    /// Sets the path exactly as given. An empty path is allowed.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.req.path = path.into();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.req.query = Some(query.into());
        self
    }

    /// Appends a header.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header name or value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid header value `{value}`: {e}"));
        self.req.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.req.body = body.into();
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.req.params.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.req.remote_addr = Some(addr);
        self
    }

    pub fn build(self) -> Request {
        self.req
    }
}
