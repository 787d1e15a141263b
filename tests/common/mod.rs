//! Shared utilities for integration tests.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use switchyard::{logger, recovery, Context, Engine};

/// The application every integration test serves.
pub fn demo_engine() -> Engine {
    let mut engine = Engine::new();
    engine.use_middleware(logger());
    engine.use_middleware(recovery());

    engine.get("/", |c: &mut Context| {
        c.html(StatusCode::OK, "<h1>Hello</h1>");
    });
    engine.get("/hello/:name", |c: &mut Context| {
        let name = c.param("name").unwrap_or_default().to_string();
        c.string(StatusCode::OK, format!("hello {name}"));
    });
    engine.get("/assets/*filepath", |c: &mut Context| {
        let filepath = c.param("filepath").unwrap_or_default().to_string();
        c.json(StatusCode::OK, &json!({ "filepath": filepath }));
    });
    engine.get("/panic", |_: &mut Context| {
        panic!("handler exploded");
    });
    engine.get("/whoami", |c: &mut Context| {
        let id = c.request_id().unwrap_or_default().to_string();
        c.string(StatusCode::OK, id);
    });

    {
        let mut api = engine.group("/api");
        api.use_middleware(|c: &mut Context| {
            if c.request().header("authorization") != Some("Bearer secret") {
                c.string(StatusCode::UNAUTHORIZED, "unauthorized");
                return;
            }
            c.next();
        });
        api.post("/echo", |c: &mut Context| {
            let message = c.post_form("message").unwrap_or_default();
            c.string(StatusCode::CREATED, message);
        });
    }

    engine
}

/// An engine with no recovery middleware.
#[allow(dead_code)]
pub fn unguarded_engine() -> Engine {
    let mut engine = Engine::new();
    engine.get("/panic", |_: &mut Context| {
        panic!("nobody catches this");
    });
    engine
}

#[allow(dead_code)]
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
