//! Tests for routing requests through chains.

mod common;
use common::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wayfinder::context::{AuthUserKey, CancellationKey, ContextKey};
use wayfinder::{
    chain, CancelSignal, Chain, Method, Outcome, PathParams, Request, Response, RouteGroup,
    Router, RouterError, Stage,
};

async fn echo_params(req: Request) -> Response {
    Response::json(req.path_params())
}

async fn explode(_req: Request) -> Response {
    panic!("handler exploded")
}

fn counting(calls: &Arc<AtomicUsize>) -> Stage {
    let calls = Arc::clone(calls);
    Stage::handler(move |_req| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Response::text("counted") }
    })
}

#[tokio::test]
async fn dispatch_binds_path_params() {
    let router = Router::builder()
        .get("/(.*)/hola/:named/(.*)", Stage::handler(echo_params))
        .build()
        .unwrap();

    let (outcome, req, res) = dispatch(&router, Request::get("/x/hola/y/z")).await;
    assert_eq!(outcome, Outcome::Dispatched);
    assert_eq!(req.path_params().get("named"), Some("y"));

    let json: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(json, serde_json::json!({"0": "x", "named": "y", "1": "z"}));
}

#[tokio::test]
async fn first_registered_route_wins() {
    let router = Router::builder()
        .get("/a/(.*)", chain::html("wildcard"))
        .get("/a/fixed", chain::html("fixed"))
        .build()
        .unwrap();

    let (_, req, res) = dispatch(&router, Request::get("/a/fixed")).await;
    assert_eq!(body(&res), "wildcard");
    assert_eq!(req.path_params().index(0), Some("fixed"));
}

#[tokio::test]
async fn method_is_part_of_the_match() {
    let router = Router::builder()
        .get("/items", chain::html("list"))
        .post("/items", chain::html("create"))
        .build()
        .unwrap();

    let (_, _, res) = dispatch(&router, Request::post("/items")).await;
    assert_eq!(body(&res), "create");

    let (outcome, _, res) = dispatch(&router, Request::new(Method::Delete, "/items")).await;
    assert_eq!(outcome, Outcome::NotFound);
    assert_eq!(res.status, 404);
    assert_eq!(body(&res), "DELETE /items not found");
}

#[tokio::test]
async fn short_circuit_skips_terminal() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .get(
            "/",
            Chain::new()
                .stage(Stage::check(|_, res| {
                    res.set_status(403);
                    false
                }))
                .handler(counting(&calls)),
        )
        .build()
        .unwrap();

    let (outcome, _, res) = dispatch(&router, Request::get("/")).await;
    assert_eq!(outcome, Outcome::Dispatched);
    assert_eq!(res.status, 403);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn passing_stages_invoke_terminal_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .stage(chain::nop())
        .get(
            "/",
            Chain::new().stage(chain::logging()).handler(counting(&calls)),
        )
        .build()
        .unwrap();

    let (_, _, res) = dispatch(&router, Request::get("/")).await;
    assert_eq!(body(&res), "counted");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stages_share_the_context_store() {
    struct Tenant;

    impl ContextKey for Tenant {
        type Value = String;
    }

    let router = Router::builder()
        .stage(Stage::check(|req, _| {
            let tenant = req.get_header("X-Tenant").unwrap_or("public").to_string();
            req.context.insert::<Tenant>(tenant);
            true
        }))
        .get(
            "/whoami",
            Stage::handler(|req| async move {
                let tenant = req.context.get::<Tenant>().cloned().unwrap_or_default();
                Response::text(tenant)
            }),
        )
        .build()
        .unwrap();

    let (_, _, res) = dispatch(&router, Request::get("/whoami").header("X-Tenant", "acme")).await;
    assert_eq!(body(&res), "acme");
}

#[tokio::test]
async fn each_request_gets_a_fresh_context() {
    let router = Router::builder()
        .get("/users/:id", Stage::handler(echo_params))
        .build()
        .unwrap();

    let (_, first, _) = dispatch(&router, Request::get("/users/1")).await;
    let (_, second, _) = dispatch(&router, Request::get("/missing")).await;
    assert_eq!(first.path_params().get("id"), Some("1"));
    assert!(second.path_params().is_empty());
}

#[tokio::test]
async fn handler_panic_is_recovered() {
    let router = Router::builder()
        .get("/boom", Stage::handler(explode))
        .build()
        .unwrap();

    let (outcome, req, res) = dispatch(&router, Request::get("/boom")).await;
    assert_eq!(outcome, Outcome::Recovered);
    assert_eq!(res.status, 500);
    assert_eq!(body(&res), "internal server error: handler exploded");
    assert_eq!(req.recovered().unwrap().message(), "handler exploded");
}

#[tokio::test]
async fn custom_error_handler_sees_failure() {
    let router = Router::builder()
        .get("/boom", Stage::handler(explode))
        .internal_error(Stage::check(|req, res| {
            let failure = req.recovered().map(ToString::to_string).unwrap_or_default();
            res.set_status(502);
            res.write(format!("upstream: {failure}"));
            true
        }))
        .build()
        .unwrap();

    let res = router.handle(Request::get("/boom")).await;
    assert_eq!(res.status, 502);
    assert_eq!(body(&res), "upstream: handler exploded");
}

#[tokio::test]
async fn basic_auth_guards_group() {
    let admin = RouteGroup::new("/admin")
        .stage(chain::basic_auth("admin", "secret"))
        .get(
            "/dashboard",
            Stage::handler(|req| async move {
                let user = req.context.get::<AuthUserKey>().cloned().unwrap_or_default();
                Response::text(format!("hello {user}"))
            }),
        );

    let router = Router::builder()
        .get("/", chain::html("home"))
        .group(admin)
        .build()
        .unwrap();

    let (_, _, res) = dispatch(&router, Request::get("/admin/dashboard")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.get_header("WWW-Authenticate"), Some(r#"Basic realm="Realm""#));

    let req = Request::get("/admin/dashboard").header("Authorization", "Basic YWRtaW46c2VjcmV0");
    let (_, _, res) = dispatch(&router, req).await;
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), "hello admin");

    let (_, _, res) = dispatch(&router, Request::get("/")).await;
    assert_eq!(body(&res), "home");
}

#[tokio::test]
async fn method_stage_rejects_other_methods() {
    let router = Router::builder()
        .route(
            Method::Post,
            "/upload",
            Chain::new()
                .stage(chain::method(Method::Put))
                .handler(chain::html("uploaded")),
        )
        .build()
        .unwrap();

    let (_, _, res) = dispatch(&router, Request::post("/upload")).await;
    assert_eq!(res.status, 400);
    assert_eq!(body(&res), "unsupported method");
}

#[tokio::test]
async fn handler_observes_cancellation() {
    let router = Router::builder()
        .get(
            "/slow",
            Stage::handler(|req| async move {
                if req.is_cancelled() {
                    Response::new(499)
                } else {
                    Response::text("done")
                }
            }),
        )
        .build()
        .unwrap();

    let signal = CancelSignal::new();
    let mut req = Request::get("/slow");
    req.context.insert::<CancellationKey>(signal.clone());
    signal.cancel();

    let (_, _, res) = dispatch(&router, req).await;
    assert_eq!(res.status, 499);
}

#[tokio::test]
async fn router_serves_concurrent_requests() {
    let router = Arc::new(
        Router::builder()
            .get("/users/:id", Stage::handler(echo_params))
            .build()
            .unwrap(),
    );

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let router = Arc::clone(&router);
            tokio::spawn(async move { router.handle(Request::get(format!("/users/{i}"))).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let res = task.await.unwrap();
        assert_eq!(body(&res), format!(r#"{{"id":"{i}"}}"#));
    }
}

#[test]
fn build_rejects_chain_without_handler() {
    let err = Router::builder()
        .get("/", Chain::new().stage(chain::nop()).handler(chain::nop()))
        .build()
        .unwrap_err();
    assert!(matches!(err, RouterError::IncompleteChain { .. }));

    let err = Router::builder()
        .get("/t", Chain::new().handler(chain::html("a")).stage(chain::html("b")))
        .build()
        .unwrap_err();
    assert!(matches!(err, RouterError::IncompleteChain { ref target } if target == "GET /t"));
}

#[test]
fn build_rejects_terminal_group_stage() {
    let group = RouteGroup::new("/admin")
        .stage(chain::html("blocked"))
        .get("/", chain::html("admin"));
    assert!(matches!(
        Router::builder().group(group).build(),
        Err(RouterError::IncompleteChain { .. })
    ));
}

#[tokio::test]
async fn extension_method_is_routed() {
    let router = Router::builder()
        .route("PROPFIND".parse().unwrap(), "/dav/:id", Stage::handler(echo_params))
        .build()
        .unwrap();

    let (outcome, _, res) =
        dispatch(&router, Request::new(Method::Other("PROPFIND".into()), "/dav/1")).await;
    assert_eq!(outcome, Outcome::Dispatched);
    assert_eq!(body(&res), r#"{"id":"1"}"#);

    let (outcome, _, _) = dispatch(&router, Request::get("/dav/1")).await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[test]
fn url_for_renders_named_routes() {
    let router = Router::builder()
        .named("file", Method::Get, "/files{/:path}*", chain::html("file"))
        .build()
        .unwrap();

    let params: PathParams = [("path", "a/b")].into_iter().collect();
    assert_eq!(router.url_for("file", &params), Some("/files/a/b".to_string()));
    assert_eq!(router.url_for("file", &PathParams::new()), Some("/files".to_string()));
}
