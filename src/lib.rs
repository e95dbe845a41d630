//! # astor
//!
//! A minimal HTTP framework for Rust services behind a reverse proxy, with
//! the one piece of middleware every such service needs first: an access log
//! that knows the client's real IP.
//!
//! ## The contract
//!
//! nginx handles TLS, rate limiting, slow clients, and body-size limits.
//! astor does not. What's left for astor:
//!
//! - Radix-tree routing — O(path-length) lookup via [`matchit`]
//! - Async I/O — hyper + tokio, HTTP/1.1 and HTTP/2
//! - A middleware chain with [`middleware::log`] built in
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! Behind a proxy the TCP peer is the proxy, not the client. The access log
//! reads `X-Real-IP`, then `X-Forwarded-For`, and only then the peer
//! address. See [`Request::real_ip`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use astor::{HttpError, Request, Response, Router, Server, middleware};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users",     create_user)
//!         .wrap(middleware::log());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, HttpError> {
//!     let id = req.param("id").ok_or(StatusCode::BAD_REQUEST)?;
//!     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes()))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::{Error, HttpError};
pub use handler::{Handler, IntoOutcome, Outcome};
pub use request::{Request, RequestBuilder, X_FORWARDED_FOR, X_REAL_IP};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
