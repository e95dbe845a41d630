//! Access logging behind a reverse proxy.
//!
//! Run with:
//!   cargo run --example access_log
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'x-real-ip: 203.0.113.7' http://localhost:3000/users/42
//!   curl -H 'x-forwarded-for: 198.51.100.4, 10.0.0.1' http://localhost:3000/users/7
//!   curl -X POST http://localhost:3000/users
//!   curl http://localhost:3000/healthz        # not logged

use astor::{HttpError, Request, Response, Router, Server, middleware};
use http::StatusCode;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .get("/healthz",       liveness)
        .wrap(middleware::log().exclude("/healthz"));

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id} → 200, or 404 through the error path
async fn get_user(req: Request) -> Result<Response, HttpError> {
    let id = req.param("id").unwrap_or("unknown");
    if id != "42" {
        return Err(HttpError::new(StatusCode::NOT_FOUND, format!("no user {id}")));
    }
    Ok(Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes()))
}

// POST /users → 400 without a body, 201 otherwise
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec())
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn liveness(_req: Request) -> &'static str {
    "ok"
}
