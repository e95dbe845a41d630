//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so we use **trait objects** (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_outcome() })  ← BoxFuture
//! ```
//!
//! Every handler resolves to an [`Outcome`]. Handlers that cannot fail return
//! anything [`IntoResponse`]; handlers that can return `Result<T, E>` and the
//! `Err` travels up through middleware untouched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HttpError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What a handler, or a middleware, produces for one request.
pub type Outcome = Result<Response, HttpError>;

/// A heap-allocated, type-erased future that resolves to an [`Outcome`].
///
/// `Pin<Box<…>>` lets the runtime poll the future in place; `Send + 'static`
/// lets tokio move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into an [`Outcome`].
///
/// Implemented for every [`IntoResponse`] type (always `Ok`), for a bare
/// [`HttpError`] (always `Err`) and for `Result<T, E>` where `E` converts
/// into [`HttpError`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<T: IntoResponse> IntoOutcome for T {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl IntoOutcome for HttpError {
    fn into_outcome(self) -> Outcome {
        Err(self)
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<HttpError>,
{
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    async fn fails(_req: Request) -> Result<Response, HttpError> {
        Err(HttpError::new(StatusCode::CONFLICT, "taken"))
    }

    async fn gives_up(_req: Request) -> HttpError {
        HttpError::from("db unavailable")
    }

    #[tokio::test]
    async fn bare_error_stays_an_error() {
        let outcome = gives_up.into_boxed_handler().call(Request::builder().build()).await;
        let err = outcome.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "db unavailable");
    }

    #[tokio::test]
    async fn infallible_handler_is_ok() {
        let outcome = ok.into_boxed_handler().call(Request::builder().build()).await;
        assert_eq!(outcome.unwrap().body(), b"ok");
    }

    #[tokio::test]
    async fn fallible_handler_keeps_error() {
        let outcome = fails.into_boxed_handler().call(Request::builder().build()).await;
        let err = outcome.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "taken");
    }
}
