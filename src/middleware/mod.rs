//! Middleware layer.
//!
//! Middleware intercepts requests and outcomes and is the right place for
//! cross-cutting concerns: access logging, metrics, request-id injection,
//! and authentication-header inspection.
//!
//! A middleware receives the request and a [`Next`], the rest of the chain.
//! It may inspect the request, call `next.run(req)`, and look at the
//! [`Outcome`] on the way back. Errors from the handler arrive as `Err` and
//! should be passed on unchanged unless the middleware means to recover.
//!
//! ```rust,no_run
//! use astor::{Request, Response, Router, middleware::{self, Next}};
//!
//! async fn hello(_req: Request) -> Response { Response::text("hello") }
//!
//! let app = Router::new()
//!     .get("/", hello)
//!     .wrap(middleware::log())
//!     .wrap(|req: Request, next: Next| async move {
//!         let mut outcome = next.run(req).await;
//!         if let Ok(res) = &mut outcome {
//!             res.headers_mut().push(("x-served-by".into(), "astor".into()));
//!         }
//!         outcome
//!     });
//! ```
//!
//! Built-in middleware:
//! - [`log`]: one access-log event per request with IP, method, path,
//!   status and latency

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler, Outcome};
use crate::request::Request;

mod log;

pub use self::log::{Log, log};
pub use crate::handler::BoxFuture;

/// A shared, type-erased middleware.
pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// Request/outcome interceptor.
///
/// Implemented for any `Fn(Request, Next) -> impl Future<Output = Outcome>`,
/// so a closure or `async fn` works as well as a struct.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self)(req, next))
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The remainder of a middleware chain, ending at the route handler.
///
/// Cloning the chain costs one `Arc` increment; the middleware list itself is
/// built once when the router is assembled.
pub struct Next {
    chain: Arc<[BoxedMiddleware]>,
    position: usize,
    handler: BoxedHandler,
}

impl Next {
    /// A chain with no middleware in front of `handler`.
    ///
    /// Wraps a single handler directly, which is how middleware is usually
    /// unit-tested: `log().handle(req, Next::new(handler))`.
    pub fn new(handler: impl Handler) -> Self {
        Self::from_parts(Arc::from(Vec::new()), handler.into_boxed_handler())
    }

    pub(crate) fn from_parts(chain: Arc<[BoxedMiddleware]>, handler: BoxedHandler) -> Self {
        Self { chain, position: 0, handler }
    }

    /// Runs the next middleware, or the handler when none are left.
    pub async fn run(mut self, req: Request) -> Outcome {
        let middleware = self.chain.get(self.position).cloned();
        match middleware {
            Some(middleware) => {
                self.position += 1;
                middleware.handle(req, self).await
            }
            None => self.handler.call(req).await,
        }
    }
}
