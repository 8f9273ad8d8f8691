//! Resource routing, end to end through the frozen application.

use http::{Method, StatusCode};
use proptest::prelude::*;
use std::sync::Arc;
use trellis::prelude::*;
use trellis::ResourceKind;
use trellis_test::TestClient;

/// An action that answers with its own key and the matched params.
fn action(key: &str) -> impl Endpoint {
    let key = key.to_string();
    endpoint_fn(move |req: Request| {
        let key = key.clone();
        async move {
            let params = req
                .extensions()
                .get::<Params>()
                .map(|params| {
                    params
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect::<Vec<_>>()
                        .join("&")
                })
                .unwrap_or_default();
            Response::text(StatusCode::OK, format!("{key} {params}").trim_end())
        }
    })
}

fn slice_with(keys: &[&str]) -> Arc<Slice> {
    let container = Arc::new(Container::new("main"));
    for key in keys {
        container.register_endpoint(*key, action(key));
    }
    container.boot();
    Arc::new(Slice::new("main", container))
}

fn draw<F>(keys: &[&str], routes: F) -> App
where
    F: FnOnce(&mut Router) -> RoutingResult<()>,
{
    Router::draw(slice_with(keys), RoutingConfig::default(), routes).unwrap()
}

/// Draws against a registry that never boots, so no key is checked.
fn sketch<F>(routes: F) -> App
where
    F: FnOnce(&mut Router) -> RoutingResult<()>,
{
    let slice = Arc::new(Slice::new("main", Arc::new(Container::new("main"))));
    Router::draw(slice, RoutingConfig::default(), routes).unwrap()
}

const POSTS: [&str; 7] = [
    "actions.posts.index",
    "actions.posts.new",
    "actions.posts.create",
    "actions.posts.show",
    "actions.posts.edit",
    "actions.posts.update",
    "actions.posts.destroy",
];

#[tokio::test]
async fn test_posts_resource_end_to_end() {
    let app = draw(&POSTS, |r| r.resources("posts", ResourceOptions::new()));

    let table: Vec<(String, String, Option<String>, String)> = app
        .routes()
        .iter()
        .map(|route| {
            (
                route.method.as_ref().unwrap().to_string(),
                route.path.clone(),
                route.name.clone(),
                route.target.to_string(),
            )
        })
        .collect();

    let expected = [
        ("GET", "/posts", "posts", "actions.posts.index"),
        ("GET", "/posts/new", "new_post", "actions.posts.new"),
        ("POST", "/posts", "posts", "actions.posts.create"),
        ("GET", "/posts/:id", "post", "actions.posts.show"),
        ("GET", "/posts/:id/edit", "edit_post", "actions.posts.edit"),
        ("PATCH", "/posts/:id", "post", "actions.posts.update"),
        ("DELETE", "/posts/:id", "post", "actions.posts.destroy"),
    ];
    assert_eq!(table.len(), expected.len());
    for (row, (method, path, name, key)) in table.iter().zip(expected) {
        assert_eq!(row.0, method);
        assert_eq!(row.1, path);
        assert_eq!(row.2.as_deref(), Some(name));
        assert_eq!(row.3, key);
    }

    let client = TestClient::new(app);
    client.get("/posts").send().await.assert_text("actions.posts.index");
    client.get("/posts/new").send().await.assert_text("actions.posts.new");
    client.post("/posts").send().await.assert_text("actions.posts.create");
    client.get("/posts/42").send().await.assert_text("actions.posts.show id=42");
    client.get("/posts/42/edit").send().await.assert_text("actions.posts.edit id=42");
    client.patch("/posts/42").send().await.assert_text("actions.posts.update id=42");
    client.delete("/posts/42").send().await.assert_text("actions.posts.destroy id=42");
}

#[tokio::test]
async fn test_singular_profile() {
    let keys = [
        "actions.profile.new",
        "actions.profile.create",
        "actions.profile.show",
        "actions.profile.edit",
        "actions.profile.update",
        "actions.profile.destroy",
    ];
    let app = draw(&keys, |r| r.resource("profile", ResourceOptions::new()));

    assert_eq!(app.routes().len(), 6);
    assert!(app.routes().iter().all(|route| !route.path.starts_with("/profiles")));

    let client = TestClient::new(app);
    client.get("/profile").send().await.assert_text("actions.profile.show");
    client.get("/profile/new").send().await.assert_text("actions.profile.new");
    client.get("/profile/edit").send().await.assert_text("actions.profile.edit");
    client.get("/profiles/1").send().await.assert_status(StatusCode::NOT_FOUND);
    client.get("/profiles").send().await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_cafes_and_reviews() {
    let keys = ["actions.cafes.show", "actions.cafes.reviews.index"];
    let app = draw(&keys, |r| {
        r.resources_with("cafes", ResourceOptions::new().only([Action::Show]), |r| {
            r.resources("reviews", ResourceOptions::new().only([Action::Index]))
        })
    });

    let reviews = app.recognize(&Method::GET, "/cafes/9/reviews").unwrap();
    assert_eq!(reviews.registration.name.as_deref(), Some("cafe_reviews"));
    assert_eq!(reviews.registration.path, "/cafes/:cafe_id/reviews");
    assert_eq!(reviews.params.get("cafe_id"), Some("9"));

    let client = TestClient::new(app);
    client.get("/cafes/9").send().await.assert_text("actions.cafes.show id=9");
    client
        .get("/cafes/9/reviews")
        .send()
        .await
        .assert_text("actions.cafes.reviews.index cafe_id=9");
}

#[test]
fn test_deep_nesting_names() {
    let app = sketch(|r| {
        r.resources_with("cafes", ResourceOptions::new().only([]), |r| {
            r.resources_with("reviews", ResourceOptions::new().only([]), |r| {
                r.resources("comments", ResourceOptions::new().only([Action::Index, Action::Edit]))
            })
        })
    });

    let names: Vec<_> = app.routes().iter().filter_map(|route| route.name.clone()).collect();
    assert_eq!(names, ["cafe_review_comments", "edit_cafe_review_comment"]);
    assert_eq!(
        app.routes().iter().next().unwrap().target.to_string(),
        "actions.cafes.reviews.comments.index"
    );
    assert_eq!(
        app.path("edit_cafe_review_comment", &[("cafe_id", "1"), ("review_id", "2"), ("id", "3")])
            .unwrap(),
        "/cafes/1/reviews/2/comments/3/edit"
    );
}

#[test]
fn test_path_override_keeps_key_and_name() {
    let app = sketch(|r| {
        r.resources(
            "cafes",
            ResourceOptions::new().path("coffee-shops").only([Action::Index]),
        )
    });
    let route = app.recognize(&Method::GET, "/coffee-shops").unwrap();
    assert_eq!(route.registration.name.as_deref(), Some("cafes"));
    assert_eq!(route.registration.target.to_string(), "actions.cafes.index");
    assert!(app.recognize(&Method::GET, "/cafes").is_none());
}

#[test]
fn test_resources_in_named_scope() {
    let app = sketch(|r| {
        r.named_scope("/admin", "admin", |r| {
            r.resources("users", ResourceOptions::new().only([Action::Index, Action::New]))
        })
    });
    assert_eq!(app.path("admin_users", &[]).unwrap(), "/admin/users");
    assert_eq!(app.path("new_admin_user", &[]).unwrap(), "/admin/users/new");
}

#[test]
fn test_declared_kind_by_name() {
    let app = sketch(|r| {
        r.declare_resource("resource", "session", ResourceOptions::new().only_names(["create", "destroy"]))
    });
    let paths: Vec<_> = app.routes().iter().map(|route| route.path.as_str()).collect();
    assert_eq!(paths, ["/session", "/session"]);
}

fn arb_actions() -> impl Strategy<Value = Vec<Action>> {
    proptest::sample::subsequence(Action::ALL.to_vec(), 0..=7).prop_shuffle()
}

proptest! {
    #[test]
    fn prop_only_is_ordered_intersection(only in arb_actions(), plural in any::<bool>()) {
        let kind = if plural { ResourceKind::Plural } else { ResourceKind::Singular };
        let definition = trellis::ResourceDefinition::new(
            "widgets",
            kind,
            ResourceOptions::new().only(only.clone()),
        );

        let expected: Vec<Action> = kind
            .default_actions()
            .into_iter()
            .filter(|action| only.contains(action))
            .collect();
        prop_assert_eq!(definition.actions(), expected);
    }

    #[test]
    fn prop_except_is_ordered_difference(except in arb_actions(), plural in any::<bool>()) {
        let kind = if plural { ResourceKind::Plural } else { ResourceKind::Singular };
        let definition = trellis::ResourceDefinition::new(
            "widgets",
            kind,
            ResourceOptions::new().except(except.clone()),
        );

        let expected: Vec<Action> = kind
            .default_actions()
            .into_iter()
            .filter(|action| !except.contains(action))
            .collect();
        prop_assert_eq!(definition.actions(), expected);
    }

    #[test]
    fn prop_nested_names_stable_under_sibling_order(
        siblings in proptest::sample::subsequence(vec!["tags", "photos", "menus", "owners"], 0..=4)
            .prop_shuffle(),
        before in any::<bool>(),
    ) {
        let app = sketch(|r| {
            r.resources_with("cafes", ResourceOptions::new().only([]), |r| {
                if before {
                    for sibling in &siblings {
                        r.resources(sibling, ResourceOptions::new())?;
                    }
                }
                r.resources("reviews", ResourceOptions::new())?;
                if !before {
                    for sibling in &siblings {
                        r.resources(sibling, ResourceOptions::new())?;
                    }
                }
                Ok(())
            })
        });

        let names: Vec<(String, String)> = app
            .routes()
            .iter()
            .filter(|route| route.target.to_string().starts_with("actions.cafes.reviews."))
            .map(|route| (route.name.clone().unwrap_or_default(), route.path.clone()))
            .collect();

        prop_assert_eq!(names.len(), 7);
        prop_assert_eq!(&names[0], &("cafe_reviews".to_string(), "/cafes/:cafe_id/reviews".to_string()));
        prop_assert_eq!(&names[1].0, "new_cafe_review");
        prop_assert_eq!(&names[4].0, "edit_cafe_review");
    }
}
