//! Error types.
//!
//! Two kinds of failure, kept apart on purpose:
//!
//! - [`Error`] — infrastructure: binding a port, accepting a connection.
//! - [`HttpError`] — a handler gave up on a request. It travels back up the
//!   middleware chain as `Err(HttpError)` and becomes a response at the top.

use std::borrow::Cow;
use std::fmt;

use http::StatusCode;

use crate::response::Response;

/// The error type returned by astor's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as [`HttpError`]
/// or plain [`Response`] values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port or accepting a connection.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

// ── HttpError ─────────────────────────────────────────────────────────────────

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failed request, returned by a handler as the `Err` side of its outcome.
///
/// ```rust
/// use astor::{HttpError, Request, Response};
/// use http::StatusCode;
///
/// async fn get_user(req: Request) -> Result<Response, HttpError> {
///     let id = req.param("id").ok_or(StatusCode::BAD_REQUEST)?;
///     if id != "42" {
///         return Err(HttpError::new(StatusCode::NOT_FOUND, "no such user"));
///     }
///     Ok(Response::text("alice"))
/// }
/// ```
///
/// Middleware sees the error before it is turned into a response, so an
/// access log can record that the handler failed and why.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: Cow<'static, str>,
    source: Option<BoxError>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, message: message.into(), source: None }
    }

    /// `500 Internal Server Error` caused by `source`.
    ///
    /// The source's text is kept for logs but never sent to the client.
    pub fn internal(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: Cow::Owned(source.to_string()),
            source: Some(source),
        }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A bare status: `Err(StatusCode::NOT_FOUND)?`. The message is the reason phrase.
impl From<StatusCode> for HttpError {
    fn from(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or(""))
    }
}

/// A plain message is a server-side failure, like a bare `errors.New` string.
impl From<&'static str> for HttpError {
    fn from(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<String> for HttpError {
    fn from(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<std::io::Error> for HttpError {
    fn from(e: std::io::Error) -> Self {
        Self::internal(e)
    }
}

impl HttpError {
    /// The error pipeline's last step: what the client actually receives.
    ///
    /// Client errors carry their message. Server errors send only the reason
    /// phrase, so internal detail stays in the logs.
    ///
    /// Not an `IntoResponse` impl: a handler returning `HttpError` must stay
    /// on the `Err` side until the server reaches this point.
    pub(crate) fn into_response(self) -> Response {
        let body = if self.status.is_server_error() {
            Cow::Borrowed(self.status.canonical_reason().unwrap_or(""))
        } else {
            self.message
        };
        Response::builder().status(self.status).text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_is_a_server_error() {
        let err = HttpError::from("error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "error");
    }

    #[test]
    fn internal_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = HttpError::from(io);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "disk on fire");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn server_error_body_hides_detail() {
        let res = HttpError::from("db password rejected").into_response();
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body(), b"Internal Server Error");
    }

    #[test]
    fn client_error_body_carries_message() {
        let res = HttpError::new(StatusCode::NOT_FOUND, "no such user").into_response();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"no such user");
    }
}
