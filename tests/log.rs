mod common;

use std::net::SocketAddr;

use astor::middleware::{self, Middleware, Next};
use astor::{HttpError, Outcome, Request, Response};
use http::{Method, StatusCode};

fn replies(status: StatusCode) -> impl Fn(Request) -> std::future::Ready<Response> + Send + Sync + 'static {
    move |_req| std::future::ready(Response::builder().status(status).text("test"))
}

async fn ok(_req: Request) -> &'static str {
    "test"
}

async fn fails(_req: Request) -> Result<Response, HttpError> {
    Err(HttpError::from("error"))
}

async fn run(log: middleware::Log, req: Request, next: Next) -> Outcome {
    log.handle(req, next).await
}

fn peer() -> SocketAddr {
    "127.0.0.1:54321".parse().unwrap()
}

#[tokio::test]
async fn one_line_per_status_class() {
    let cases = [
        (StatusCode::OK, "INFO"),
        (StatusCode::TEMPORARY_REDIRECT, "INFO"),
        (StatusCode::NOT_FOUND, "WARN"),
        (StatusCode::INTERNAL_SERVER_ERROR, "ERROR"),
    ];

    for (status, level) in cases {
        let (logs, _guard) = common::capture();

        let req = Request::builder().path("/").remote_addr(peer()).build();
        let res = run(middleware::log(), req, Next::new(replies(status))).await.unwrap();
        assert_eq!(res.status_code(), status);

        let lines = logs.access_lines();
        assert_eq!(lines.len(), 1, "{status}: {lines:?}");
        assert!(lines[0].contains(&format!("status={}", status.as_u16())), "{}", lines[0]);
        assert!(lines[0].contains(level), "{}", lines[0]);
        assert!(lines[0].contains("method=GET"));
        assert!(lines[0].contains("path=/ "));
        assert!(lines[0].contains("bytes_out=4"));
        assert!(lines[0].contains("latency="));
    }
}

#[tokio::test]
async fn handler_error_is_logged_and_returned() {
    let (logs, _guard) = common::capture();

    let req = Request::builder().path("").build();
    let err = run(middleware::log(), req, Next::new(fails)).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.to_string(), "error");

    let lines = logs.access_lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("request failed"));
    assert!(lines[0].contains("path= status=500"), "{}", lines[0]);
    assert!(lines[0].contains("error=error"));
}

#[tokio::test]
async fn bare_error_from_handler_is_logged_as_failure() {
    let (logs, _guard) = common::capture();

    let gives_up = |_req: Request| async { HttpError::from("db unavailable") };
    let err = run(middleware::log(), Request::builder().build(), Next::new(gives_up))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "db unavailable");
    let lines = logs.access_lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("request failed"), "{}", lines[0]);
    assert!(lines[0].contains("status=500"));
    assert!(lines[0].contains("error=db unavailable"), "{}", lines[0]);
    assert!(!lines[0].contains("bytes_out="));
}

#[tokio::test]
async fn client_error_from_handler_logs_its_status() {
    let (logs, _guard) = common::capture();

    let not_found = |_req: Request| async { Err::<Response, _>(StatusCode::NOT_FOUND) };
    let req = Request::builder().method(Method::DELETE).path("/users/7").build();
    let err = run(middleware::log(), req, Next::new(not_found)).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    let lines = logs.access_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("WARN"));
    assert!(lines[0].contains("method=DELETE"));
    assert!(lines[0].contains("status=404"));
}

#[tokio::test]
async fn ip_from_x_real_ip_wins() {
    let (logs, _guard) = common::capture();

    let req = Request::builder()
        .header("X-Real-IP", "127.0.0.1")
        .header("X-Forwarded-For", "10.9.9.9")
        .remote_addr("192.0.2.1:4000".parse().unwrap())
        .build();
    run(middleware::log(), req, Next::new(ok)).await.unwrap();

    let lines = logs.access_lines();
    assert!(lines[0].contains("remote_ip=127.0.0.1 "), "{}", lines[0]);
}

#[tokio::test]
async fn ip_from_x_forwarded_for() {
    let (logs, _guard) = common::capture();

    let req = Request::builder()
        .header("X-Forwarded-For", "127.0.0.1")
        .remote_addr("192.0.2.1:4000".parse().unwrap())
        .build();
    run(middleware::log(), req, Next::new(ok)).await.unwrap();

    let lines = logs.access_lines();
    assert!(lines[0].contains("remote_ip=127.0.0.1 "), "{}", lines[0]);
}

#[tokio::test]
async fn ip_from_multi_hop_forwarded_for_is_originating_client() {
    let (logs, _guard) = common::capture();

    let req = Request::builder()
        .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1, 10.0.0.2")
        .remote_addr("10.0.0.2:4000".parse().unwrap())
        .build();
    run(middleware::log(), req, Next::new(ok)).await.unwrap();

    let lines = logs.access_lines();
    assert!(lines[0].contains("remote_ip=203.0.113.7 "), "{}", lines[0]);
    assert!(!lines[0].contains("10.0.0.1"), "{}", lines[0]);
}

#[tokio::test]
async fn ip_from_remote_addr() {
    let (logs, _guard) = common::capture();

    let req = Request::builder().remote_addr(peer()).build();
    run(middleware::log(), req, Next::new(ok)).await.unwrap();

    let lines = logs.access_lines();
    assert!(lines[0].contains("remote_ip=127.0.0.1 "), "{}", lines[0]);
    assert!(!lines[0].contains("54321"));
}

#[tokio::test]
async fn ip_unknown_without_peer() {
    let (logs, _guard) = common::capture();

    run(middleware::log(), Request::builder().build(), Next::new(ok)).await.unwrap();

    assert!(logs.access_lines()[0].contains("remote_ip=- "));
}

#[tokio::test]
async fn excluded_path_runs_handler_silently() {
    let (logs, _guard) = common::capture();
    let log = middleware::log().exclude("/healthz");

    let req = Request::builder().path("/healthz").build();
    let res = run(log.clone(), req, Next::new(ok)).await.unwrap();
    assert_eq!(res.body(), b"test");
    assert!(logs.access_lines().is_empty());

    let req = Request::builder().path("/healthz/deep").build();
    run(log, req, Next::new(ok)).await.unwrap();
    assert_eq!(logs.access_lines().len(), 1);
}

#[tokio::test]
async fn handler_events_carry_request_span() {
    let (logs, _guard) = common::capture();

    let chatty = |_req: Request| async {
        tracing::info!("loading user");
        "alice"
    };
    let req = Request::builder().path("/users/42").build();
    run(middleware::log(), req, Next::new(chatty)).await.unwrap();

    let contents = logs.contents();
    let handler_line = contents.lines().find(|l| l.contains("loading user")).unwrap();
    assert!(handler_line.contains("request{method=GET path=/users/42}"), "{handler_line}");

    let access = logs.access_lines();
    assert_eq!(access.len(), 1);
    assert!(!access[0].contains("request{"));
}
