//! End-to-end dispatch scenarios over real HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::StatusCode;
use rpc_shim::{RegistrationOptions, Reply, RequestContext, ResponseSink};
use serde::Serialize;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_echo_returns_json() {
    let server = common::start_server(common::config_with_prefix("/api/"), |r| {
        r.register("echo", |_: &mut RequestContext, _: &Bytes| Reply::Body(json!({"msg": "hi"})));
    })
    .await;

    let res = common::client().post(server.url("/api/echo")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    // Content-Type is left to callbacks
    assert!(res.headers().get(CONTENT_TYPE).is_none());
    assert_eq!(res.text().await.unwrap(), r#"{"msg":"hi"}"#);

    server.stop();
}

#[tokio::test]
async fn test_status_only_reply() {
    let server = common::start_server(common::config_with_prefix("/api"), |r| {
        r.register("status", |_: &mut RequestContext, _: &Bytes| Reply::<()>::status(404));
    })
    .await;

    let res = common::client().post(server.url("/api/status")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert!(res.bytes().await.unwrap().is_empty());

    server.stop();
}

#[tokio::test]
async fn test_non_post_rejected_before_procedure() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let inv = invoked.clone();

    let server = common::start_server(common::config_with_prefix("/api"), move |r| {
        r.add_pre_callback(common::reject_non_post);
        r.register("echo", move |_: &mut RequestContext, _: &Bytes| {
            inv.fetch_add(1, Ordering::SeqCst);
            Reply::Body(json!({"msg": "hi"}))
        });
    })
    .await;

    let client = common::client();
    let res = client.get(server.url("/api/echo")).send().await.unwrap();
    assert_eq!(res.status(), 405);
    assert!(res.bytes().await.unwrap().is_empty());
    assert_eq!(invoked.load(Ordering::SeqCst), 0);

    let res = client.post(server.url("/api/echo")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(invoked.load(Ordering::SeqCst), 1);

    server.stop();
}

#[tokio::test]
async fn test_cleared_global_pre_chain() {
    let global_runs = Arc::new(AtomicUsize::new(0));
    let route_runs = Arc::new(AtomicUsize::new(0));
    let (global, route) = (global_runs.clone(), route_runs.clone());

    let server = common::start_server(common::config_with_prefix("/api"), move |r| {
        r.add_pre_callback(move |_: &mut RequestContext, sink: &mut dyn ResponseSink, _: &Parts| {
            global.fetch_add(1, Ordering::SeqCst);
            sink.write_status(StatusCode::FORBIDDEN);
            false
        });
        r.register("guarded", |_: &mut RequestContext, _: &Bytes| Reply::Body("guarded"));
        r.register_with(
            "open",
            |_: &mut RequestContext, _: &Bytes| Reply::Body("open"),
            RegistrationOptions::new().clear_global_pre().pre_callback(
                move |_: &mut RequestContext, _: &mut dyn ResponseSink, _: &Parts| {
                    route.fetch_add(1, Ordering::SeqCst);
                    true
                },
            ),
        );
    })
    .await;

    let client = common::client();
    let res = client.post(server.url("/api/open")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#""open""#);
    assert_eq!(global_runs.load(Ordering::SeqCst), 0);
    assert_eq!(route_runs.load(Ordering::SeqCst), 1);

    let res = client.post(server.url("/api/guarded")).send().await.unwrap();
    assert_eq!(res.status(), 403);
    assert_eq!(global_runs.load(Ordering::SeqCst), 1);

    server.stop();
}

#[tokio::test]
async fn test_context_flows_from_pre_chain_to_procedure() {
    #[derive(Serialize)]
    struct Greeting {
        user: String,
        bytes: usize,
    }

    let server = common::start_server(common::config_with_prefix("/"), |r| {
        r.add_pre_callback(|ctx: &mut RequestContext, _: &mut dyn ResponseSink, req: &Parts| {
            let user = req
                .headers
                .get("x-user")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("anonymous")
                .to_string();
            ctx.insert("user", user);
            true
        });
        r.register("greet", |ctx: &mut RequestContext, body: &Bytes| {
            Reply::Body(Greeting {
                user: ctx.get::<String>("user").cloned().unwrap_or_default(),
                bytes: body.len(),
            })
        });
    })
    .await;

    let res = common::client()
        .post(server.url("/greet"))
        .header("x-user", "ada")
        .body("12345")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"user": "ada", "bytes": 5}));

    server.stop();
}

#[tokio::test]
async fn test_post_chain_headers_and_abort() {
    let later_runs = Arc::new(AtomicUsize::new(0));
    let later = later_runs.clone();

    let server = common::start_server(common::config_with_prefix("/api"), move |r| {
        r.add_post_callback(|ctx: &mut RequestContext, sink: &mut dyn ResponseSink, _: &Parts| {
            sink.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            ctx.set_status(StatusCode::CREATED);
            false
        });
        r.add_post_callback(move |_: &mut RequestContext, _: &mut dyn ResponseSink, _: &Parts| {
            later.fetch_add(1, Ordering::SeqCst);
            true
        });
        r.register("create", |_: &mut RequestContext, _: &Bytes| Reply::Body(json!({"id": 7})));
    })
    .await;

    let res = common::client().post(server.url("/api/create")).send().await.unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"id":7}"#);
    assert_eq!(later_runs.load(Ordering::SeqCst), 0);

    server.stop();
}

#[tokio::test]
async fn test_silent_pre_abort_is_empty_ok() {
    let server = common::start_server(common::config_with_prefix("/api"), |r| {
        r.add_pre_callback(|_: &mut RequestContext, _: &mut dyn ResponseSink, _: &Parts| false);
        r.register("echo", |_: &mut RequestContext, _: &Bytes| Reply::Body("unreachable"));
    })
    .await;

    let res = common::client().post(server.url("/api/echo")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.bytes().await.unwrap().is_empty());

    server.stop();
}

#[tokio::test]
async fn test_unknown_message_is_not_found() {
    let server = common::start_server(common::config_with_prefix("/api"), |r| {
        r.register("echo", |_: &mut RequestContext, _: &Bytes| Reply::Body(1));
    })
    .await;

    let client = common::client();
    for path in ["/api/missing", "/echo", "/api/echo/extra", "/"] {
        let res = client.post(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 404, "path {path}");
    }

    // Query strings do not affect the lookup
    let res = client.post(server.url("/api/echo?trace=1")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    server.stop();
}

#[tokio::test]
async fn test_oversized_body_is_expectation_failed() {
    let mut config = common::config_with_prefix("/api");
    config.limits.max_body_size = 16;

    let server = common::start_server(config, |r| {
        r.register("echo", |_: &mut RequestContext, body: &Bytes| Reply::Body(body.len()));
    })
    .await;

    let client = common::client();
    let res = client.post(server.url("/api/echo")).body("x".repeat(1024)).send().await.unwrap();
    assert_eq!(res.status(), 417);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client.post(server.url("/api/echo")).body("small").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "5");

    server.stop();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = common::start_server(common::config_with_prefix("/api"), |r| {
        r.register("echo", |_: &mut RequestContext, _: &Bytes| Reply::Body(()));
    })
    .await;

    let client = common::client();
    let res = client
        .post(server.url("/api/echo"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-42");

    let res = client.post(server.url("/api/echo")).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    server.stop();
}

#[tokio::test]
async fn test_percent_encoded_paths_reach_their_message() {
    let server = common::start_server(common::config_with_prefix("/api"), |r| {
        r.register("echo", |_: &mut RequestContext, _: &Bytes| Reply::Body("echo"));
        r.register("hello world", |_: &mut RequestContext, _: &Bytes| Reply::Body("hello"));
        r.register("café", |_: &mut RequestContext, _: &Bytes| Reply::Body("café"));
    })
    .await;

    let client = common::client();
    for (path, expected) in [
        ("/api/%65cho", r#""echo""#),
        ("/api/hello%20world", r#""hello""#),
        ("/api/caf%C3%A9", r#""café""#),
    ] {
        let res = client.post(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "path {path}");
        assert_eq!(res.text().await.unwrap(), expected, "path {path}");
    }

    server.stop();
}
