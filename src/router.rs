//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. Middleware registered with [`Router::wrap`] runs around
//! every request, including the `404` for paths nothing matched.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::HttpError;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Arc<[BoxedMiddleware]>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Arc::from(Vec::new()),
            not_found: not_found.into_boxed_handler(),
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use astor::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Append a middleware. The first one added is the outermost.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        let mut chain = self.middleware.to_vec();
        chain.push(Arc::new(middleware));
        self.middleware = chain.into();
        self
    }

    /// Finds the handler for `method` + `path` and puts the middleware chain
    /// in front of it. Path params are returned alongside.
    ///
    /// A miss still gets the chain, around a handler that fails with `404`.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> (Next, HashMap<String, String>) {
        let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) else {
            return (self.chain(Arc::clone(&self.not_found)), HashMap::new());
        };

        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        (self.chain(handler), params)
    }

    /// The middleware chain in front of `handler`.
    pub(crate) fn chain(&self, handler: BoxedHandler) -> Next {
        Next::from_parts(Arc::clone(&self.middleware), handler)
    }
}

async fn not_found(_req: Request) -> HttpError {
    HttpError::from(StatusCode::NOT_FOUND)
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
