//! End-to-end behaviour of the service's middleware stack, driven in-process.

use bytes::Bytes;
use fabuverse::middleware::{Logging, Trace, TraceConfig};
use fabuverse::{Request, Response, Router, Service, service};
use http::{Method, StatusCode};
use uuid::Uuid;

fn is_uuid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

fn get(uri: &str, headers: &[(&str, &str)]) -> Request {
    let mut builder = http::Request::get(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Request::from(builder.body(Bytes::new()).unwrap())
}

fn header<'a>(res: &'a Response, name: &str) -> &'a str {
    res.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

fn app() -> Service {
    service::app().into_service()
}

#[tokio::test]
async fn origin_request_gets_fresh_identity() {
    let res = app().call(get("/reverse?word=lobster", &[])).await;

    assert_eq!(res.code(), StatusCode::OK);
    assert!(is_uuid(header(&res, "Trace-Id")));
    assert!(is_uuid(header(&res, "Span-Id")));
    assert_ne!(header(&res, "Trace-Id"), header(&res, "Span-Id"));
    assert_eq!(header(&res, "Parent-Id"), "");
}

#[tokio::test]
async fn caller_identity_is_continued() {
    let req = get(
        "/reverse?word=lobster",
        &[("Trace-Id", "caller trace id"), ("Span-Id", "caller span id")],
    );
    let res = app().call(req).await;

    assert_eq!(header(&res, "Trace-Id"), "caller trace id");
    assert_ne!(header(&res, "Span-Id"), "caller span id");
    assert!(is_uuid(header(&res, "Span-Id")));
    assert_eq!(header(&res, "Parent-Id"), "caller span id");
}

#[tokio::test]
async fn reverse_endpoint_behind_the_stack() {
    let res = app().call(get("/reverse?word=lobster", &[])).await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(res.body(), b"retsbol");
    assert!(res.headers().contains_key("Trace-Id"));
    assert!(res.headers().contains_key("Span-Id"));
    assert!(res.headers().contains_key("Parent-Id"));
}

#[tokio::test]
async fn every_request_gets_its_own_span() {
    let svc = app();
    let a = svc.call(get("/reverse?word=a", &[("Trace-Id", "T")])).await;
    let b = svc.call(get("/reverse?word=b", &[("Trace-Id", "T")])).await;

    assert_eq!(header(&a, "Trace-Id"), header(&b, "Trace-Id"));
    assert_ne!(header(&a, "Span-Id"), header(&b, "Span-Id"));
}

#[tokio::test]
async fn unrouted_requests_are_traced_too() {
    let svc = app();

    let res = svc.call(get("/nowhere", &[])).await;
    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert!(is_uuid(header(&res, "Trace-Id")));
    assert!(is_uuid(header(&res, "Span-Id")));
}

#[tokio::test]
async fn reverse_answers_any_method() {
    let svc = app();

    let req = Request::from(
        http::Request::post("/reverse?word=lobster")
            .header("Trace-Id", "caller trace id")
            .header("Span-Id", "caller span id")
            .body(Bytes::from_static(b"ignored"))
            .unwrap(),
    );
    let res = svc.call(req).await;
    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(res.body(), b"retsbol");
    assert_eq!(header(&res, "Trace-Id"), "caller trace id");
    assert!(is_uuid(header(&res, "Span-Id")));
    assert_eq!(header(&res, "Parent-Id"), "caller span id");

    for method in [Method::HEAD, Method::PUT, Method::DELETE] {
        let req = Request::from(
            http::Request::builder()
                .method(method.clone())
                .uri("/reverse?word=ab")
                .body(Bytes::new())
                .unwrap(),
        );
        let res = svc.call(req).await;
        assert_eq!(res.code(), StatusCode::OK, "{method}");
        assert_eq!(res.body(), b"ba");
        assert!(is_uuid(header(&res, "Trace-Id")));
        assert!(is_uuid(header(&res, "Span-Id")));
        assert_eq!(header(&res, "Parent-Id"), "");
    }
}

async fn boom(_: Request) -> Response {
    panic!("handler blew up")
}

#[tokio::test]
async fn panicking_handler_still_returns_trace_headers() {
    let svc = Router::new()
        .on(Method::GET, "/boom", boom)
        .layer(Logging::new())
        .layer(Trace::new())
        .into_service();

    let res = svc.call(get("/boom", &[("Trace-Id", "T"), ("Span-Id", "S")])).await;

    assert_eq!(res.code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header(&res, "Trace-Id"), "T");
    assert_eq!(header(&res, "Parent-Id"), "S");
    assert!(is_uuid(header(&res, "Span-Id")));
}

#[tokio::test]
async fn deterministic_generator_through_the_router() {
    let svc = Router::new()
        .on(Method::GET, "/reverse", service::reverse::reverse_word)
        .layer(Trace::with_config(TraceConfig::default().generator(|| "stub".to_owned())))
        .into_service();

    let res = svc.call(get("/reverse?word=ab", &[])).await;
    assert_eq!(res.body(), b"ba");
    assert_eq!(header(&res, "Trace-Id"), "stub");
    assert_eq!(header(&res, "Span-Id"), "stub");
    assert_eq!(header(&res, "Parent-Id"), "");
}

#[tokio::test]
async fn handlers_can_read_the_trace_context() {
    async fn whoami(req: Request) -> Response {
        let ctx = req.trace().expect("trace context attached");
        Response::text(ctx.span_id().to_owned())
    }

    let svc = Router::new()
        .on(Method::GET, "/whoami", whoami)
        .layer(Logging::new())
        .layer(Trace::new())
        .into_service();

    let res = svc.call(get("/whoami", &[])).await;
    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(res.body(), header(&res, "Span-Id").as_bytes());
}
