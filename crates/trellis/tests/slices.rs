//! Slices, mounts, redirects and response conventions.

use http::{Method, StatusCode};
use std::sync::Arc;
use trellis::prelude::*;
use trellis_test::TestClient;

fn labelled(label: &'static str) -> impl Endpoint {
    endpoint_fn(move |req: Request| async move {
        Response::text(StatusCode::OK, &format!("{label} {}", req.uri()))
    })
}

fn container(name: &str, keys: &[(&str, &'static str)]) -> Arc<Container> {
    let container = Arc::new(Container::new(name));
    for (key, label) in keys {
        container.register_endpoint(*key, labelled(label));
    }
    container.boot();
    container
}

fn tree() -> Arc<Slice> {
    let admin = Slice::new(
        "admin",
        container("admin", &[("actions.dashboard.show", "admin-dashboard"), ("actions.users.index", "admin-users")]),
    )
    .with_routes(|r| {
        r.root("dashboard.show")?;
        r.resources("users", ResourceOptions::new().only([Action::Index]))
    });

    let main = container(
        "main",
        &[("actions.home.index", "main-home"), ("actions.dashboard.show", "main-dashboard")],
    );
    Arc::new(Slice::new("main", main).with_child(admin))
}

#[tokio::test]
async fn test_slice_block_resolves_against_child_registry() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.get("/dashboard", "dashboard.show")?;
        r.slice("admin", "/admin", |r| r.get("/dashboard", Route::to("dashboard.show").named("dashboard")))
    })
    .unwrap();

    assert_eq!(app.path("admin_dashboard", &[]).unwrap(), "/admin/dashboard");

    let client = TestClient::new(app);
    client.get("/dashboard").send().await.assert_text("main-dashboard /dashboard");
    client
        .get("/admin/dashboard")
        .send()
        .await
        .assert_text("admin-dashboard /admin/dashboard");
}

#[test]
fn test_slice_keys_are_verified_against_child() {
    let err = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.slice("admin", "/admin", |r| r.get("/home", "home.index"))
    })
    .unwrap_err();

    assert!(matches!(
        err,
        RoutingError::Resolution(ResolveError::MissingAction { ref slice, .. }) if slice == "admin"
    ));
}

#[tokio::test]
async fn test_mount_slice_strips_prefix() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.root("home.index")?;
        r.mount_slice("admin", "/admin")
    })
    .unwrap();

    let mounted = app.recognize(&Method::DELETE, "/admin/users").unwrap();
    assert_eq!(mounted.registration.target.to_string(), "slice:admin");

    let client = TestClient::new(app);
    client.get("/").send().await.assert_text("main-home /");
    client.get("/admin").send().await.assert_text("admin-dashboard /");
    client.get("/admin/users?page=2").send().await.assert_text("admin-users /users?page=2");
    client
        .post("/admin/users")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    client.get("/admin/nope").send().await.assert_status(StatusCode::NOT_FOUND);
}

#[test]
fn test_mount_unknown_slice() {
    let err = Router::draw(tree(), RoutingConfig::default(), |r| r.mount_slice("billing", "/billing")).unwrap_err();
    assert!(matches!(err, RoutingError::UnknownSlice(ref name) if name == "billing"));
}

#[tokio::test]
async fn test_mount_endpoint_in_scope() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.scope("/api", |r| r.mount(labelled("v1"), "/v1"))
    })
    .unwrap();

    let client = TestClient::new(app);
    client.put("/api/v1/posts/3").send().await.assert_text("v1 /posts/3");
    client.get("/api/v1").send().await.assert_text("v1 /");
}

#[tokio::test]
async fn test_redirects() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.redirect("/legacy", "/")?;
        r.redirect_with("/moved", "https://example.com/new", StatusCode::TEMPORARY_REDIRECT)
    })
    .unwrap();
    let client = TestClient::new(app);

    client
        .get("/legacy")
        .send()
        .await
        .assert_status(StatusCode::MOVED_PERMANENTLY)
        .assert_header("location", "/");
    client
        .get("/moved")
        .send()
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT)
        .assert_header("location", "https://example.com/new");
}

#[tokio::test]
async fn test_method_not_allowed_and_head() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.get("/dashboard", "dashboard.show")?;
        r.delete("/dashboard", Route::endpoint(labelled("wipe")))
    })
    .unwrap();
    let client = TestClient::new(app);

    client
        .post("/dashboard")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_header("allow", "GET, HEAD, DELETE");

    client.head("/dashboard").send().await.assert_status(StatusCode::OK);
    client.delete("/dashboard").send().await.assert_text("wipe /dashboard");
}

#[test]
fn test_url_and_root_names() {
    let config = RoutingConfig {
        base_url: "https://shop.example.com/".to_string(),
        ..RoutingConfig::default()
    };
    let app = Router::draw(tree(), config, |r| {
        r.root("home.index")?;
        r.named_scope("/admin", "admin", |r| r.root("dashboard.show"))
    })
    .unwrap();

    assert_eq!(app.url("root", &[]).unwrap(), "https://shop.example.com/");
    assert_eq!(app.url("admin_root", &[]).unwrap(), "https://shop.example.com/admin");
}

#[test]
fn test_routes_listing_aligns_columns() {
    let app = Router::draw(tree(), RoutingConfig::default(), |r| {
        r.root("home.index")?;
        r.mount_slice("admin", "/admin")
    })
    .unwrap();

    let listing = app.routes().to_string();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("GET  /       root  actions.home.index"));
    assert!(lines[1].starts_with("*    /admin"));
    assert!(lines[1].ends_with("slice:admin"));
}

#[tokio::test]
async fn test_verb_missing_on_static_segment_reaches_member_route() {
    let main = container("main", &[("actions.posts.new", "new"), ("actions.posts.destroy", "destroy")]);
    let app = Router::draw(Arc::new(Slice::new("main", main)), RoutingConfig::default(), |r| {
        r.resources("posts", ResourceOptions::new().only([Action::New, Action::Destroy]))
    })
    .unwrap();

    let recognized = app.recognize(&Method::DELETE, "/posts/new").unwrap();
    assert_eq!(recognized.params.get("id"), Some("new"));

    let client = TestClient::new(app);
    client.delete("/posts/new").send().await.assert_text("destroy /posts/new");
    client.get("/posts/new").send().await.assert_text("new /posts/new");
    client
        .put("/posts/new")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
