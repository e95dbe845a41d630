//! Access logging.
//!
//! One `tracing` event per request, emitted after the handler finishes:
//!
//! ```text
//! INFO astor::access: request remote_ip=203.0.113.7 method=GET path=/users/42 status=200 latency=182.4µs bytes_out=27
//! ERROR astor::access: request failed remote_ip=10.0.0.2 method=POST path=/users status=500 latency=1.1ms error=db unavailable
//! ```
//!
//! Events use the target `astor::access`, so they can be routed or silenced
//! on their own, e.g. `RUST_LOG=info,astor::access=warn` to keep only
//! failed requests. Where the lines end up is the subscriber's business:
//! install a `tracing-subscriber` writer and that is the sink.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{Instrument, error, info, info_span, warn};

use crate::handler::{BoxFuture, Outcome};
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Logs one event per request at a level matching the status class.
///
/// Emits at `INFO` for 1xx-3xx, `WARN` for 4xx and `ERROR` for 5xx.
macro_rules! access_event {
    ($status:expr, $($fields:tt)+) => {
        match $status.as_u16() {
            500.. => error!(target: "astor::access", $($fields)+),
            400..=499 => warn!(target: "astor::access", $($fields)+),
            _ => info!(target: "astor::access", $($fields)+),
        }
    };
}

/// Access-log middleware. No configuration required.
///
/// ```rust,no_run
/// use astor::{Router, middleware};
/// # async fn liveness(_: astor::Request) -> &'static str { "ok" }
///
/// let app = Router::new()
///     .get("/healthz", liveness)
///     .wrap(middleware::log().exclude("/healthz"));
/// ```
///
/// The client IP is resolved with [`Request::real_ip`]. Handler errors are
/// logged with their status and text, then returned unchanged.
pub fn log() -> Log {
    Log::new()
}

/// See [`log`].
#[derive(Clone, Debug, Default)]
pub struct Log {
    exclude: HashSet<String>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not log requests whose path is exactly `path`.
    ///
    /// The handler still runs. Useful for probes that fire every few seconds.
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.exclude.insert(path.into());
        self
    }
}

impl Middleware for Log {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        if self.exclude.contains(req.path()) {
            return Box::pin(next.run(req));
        }

        let method = req.method().clone();
        let path = req.path().to_owned();
        let remote_ip = req.real_ip().unwrap_or_else(|| "-".to_owned());

        Box::pin(async move {
            let span = info_span!("request", method = %method, path = %path);

            let start = Instant::now();
            let outcome = next.run(req).instrument(span).await;
            let latency = start.elapsed();

            record(&outcome, &method, &path, &remote_ip, latency);
            outcome
        })
    }
}

fn record(outcome: &Outcome, method: &Method, path: &str, remote_ip: &str, latency: Duration) {
    match outcome {
        Ok(res) => {
            let status = res.status_code();
            access_event!(
                status,
                %remote_ip,
                %method,
                %path,
                status = status.as_u16(),
                ?latency,
                bytes_out = res.body().len(),
                "request"
            );
        }
        Err(err) => {
            let status = err.status();
            access_event!(
                status,
                %remote_ip,
                %method,
                %path,
                status = status.as_u16(),
                ?latency,
                error = %err,
                "request failed"
            );
        }
    }
}
