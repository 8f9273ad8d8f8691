//! End-to-end middleware stack tests.
//!
//! These drive frozen chains with real requests and check both the resolved
//! order and the order middleware actually runs in.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;
use trellis_core::{endpoint_fn, BoxedEndpoint, Endpoint, RoutingError};
use trellis_middleware::{
    BoxFuture, Middleware, MiddlewareStack, Next, Position, Request, Response, ResponseExt,
};

/// Records its name into a shared journal, then continues the chain.
struct Recorder {
    name: &'static str,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl Middleware for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            self.journal.lock().push(self.name);
            next.run(request).await
        })
    }
}

fn recorder(name: &'static str, journal: &Arc<Mutex<Vec<&'static str>>>) -> Recorder {
    Recorder {
        name,
        journal: Arc::clone(journal),
    }
}

fn app(journal: &Arc<Mutex<Vec<&'static str>>>) -> BoxedEndpoint {
    let journal = Arc::clone(journal);
    Arc::new(endpoint_fn(move |_| {
        let journal = Arc::clone(&journal);
        async move {
            journal.lock().push("app");
            Response::text(StatusCode::OK, "ok")
        }
    }))
}

fn request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[tokio::test]
async fn test_chain_runs_in_resolved_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut stack = MiddlewareStack::new();
    stack.use_middleware("", recorder("session", &journal), Position::Append);
    stack.use_middleware("", recorder("csrf", &journal), Position::after("session"));
    stack.use_middleware("", recorder("logger", &journal), Position::before("session"));
    stack.use_middleware("", recorder("etag", &journal), Position::Append);

    let chains = stack.freeze(app(&journal)).unwrap();
    let status = Endpoint::call(chains.root(), request("/")).await.status();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(*journal.lock(), vec!["logger", "session", "csrf", "etag", "app"]);
}

#[tokio::test]
async fn test_scoped_chain_only_runs_under_its_prefix() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut stack = MiddlewareStack::new();
    stack.use_middleware("", recorder("logger", &journal), Position::Append);
    stack.use_middleware("/admin", recorder("auth", &journal), Position::Append);

    let chains = stack.freeze(app(&journal)).unwrap();

    Endpoint::call(&chains, request("/admin/users")).await;
    assert_eq!(*journal.lock(), vec!["logger", "auth", "app"]);

    journal.lock().clear();
    Endpoint::call(&chains, request("/posts")).await;
    assert_eq!(*journal.lock(), vec!["logger", "app"]);
}

#[test]
fn test_unknown_anchor_is_reported_with_both_names() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut stack = MiddlewareStack::new();
    stack.use_middleware("", recorder("csrf", &journal), Position::after("session"));

    let err = stack.to_chain(app(&journal)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "middleware \"csrf\" is positioned relative to unregistered middleware \"session\""
    );
    assert!(matches!(err, RoutingError::UnknownMiddleware { .. }));
}

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

proptest! {
    /// `before: N` always lands immediately before `N`, wherever `N` is declared.
    #[test]
    fn prop_before_anchor_is_adjacent(
        others in prop::sample::subsequence(NAMES.to_vec(), 0..=NAMES.len()),
        anchor_at in 0usize..=6,
        relative_at in 0usize..=7,
    ) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut decls: Vec<(&'static str, Position)> =
            others.iter().map(|n| (*n, Position::Append)).collect();
        decls.insert(anchor_at.min(decls.len()), ("n", Position::Append));
        decls.insert(relative_at.min(decls.len()), ("m", Position::before("n")));

        let mut stack = MiddlewareStack::new();
        for (name, position) in decls {
            stack.use_middleware("", recorder(name, &journal), position);
        }

        let ids = stack.ordered_ids("").unwrap();
        let m = ids.iter().position(|id| id == "m").unwrap();
        prop_assert_eq!(ids[m + 1].as_str(), "n");
        prop_assert_eq!(ids.len(), others.len() + 2);
    }

    /// Appended entries keep their relative declaration order.
    #[test]
    fn prop_appended_entries_keep_declaration_order(
        others in prop::sample::subsequence(NAMES.to_vec(), 0..=NAMES.len()),
    ) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut stack = MiddlewareStack::new();
        for name in &others {
            stack.use_middleware("", recorder(*name, &journal), Position::Append);
        }
        stack.use_middleware("", recorder("m", &journal), Position::after("a"));

        match stack.ordered_ids("") {
            Ok(ids) => {
                let appended: Vec<&str> = ids.iter().map(String::as_str).filter(|id| *id != "m").collect();
                prop_assert_eq!(appended, others.clone());
                prop_assert!(others.contains(&"a"));
            }
            Err(RoutingError::UnknownMiddleware { anchor, .. }) => {
                prop_assert_eq!(anchor.as_str(), "a");
                prop_assert!(!others.contains(&"a"));
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
