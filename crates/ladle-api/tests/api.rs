use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use ladle_api::auth::AppStateInner;
use ladle_db::Database;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".into(),
    });
    ladle_api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, token, body).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "first_name": "Test",
            "last_name": "User",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn create_ingredient(app: &Router, token: &str, name: &str, unit: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/ingredients",
        Some(token),
        Some(json!({ "name": name, "measurement_unit": unit })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn breakfast_tag_id(app: &Router) -> String {
    let (status, body) = send_json(app, "GET", "/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .find(|t| t["slug"] == "breakfast")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn recipe_body(name: &str, tag: &str, lines: &[(&str, i64)]) -> Value {
    json!({
        "name": name,
        "image": "aGVsbG8=",
        "text": "mix and cook",
        "cooking_time": 20,
        "tags": [tag],
        "ingredients": lines
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
    })
}

async fn create_recipe(
    app: &Router,
    token: &str,
    name: &str,
    tag: &str,
    lines: &[(&str, i64)],
) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/recipes",
        Some(token),
        Some(recipe_body(name, tag, lines)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let token = register(&app, "alice").await;

    let (status, me) = send_json(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reserved username
    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": "ME",
            "email": "me@example.com",
            "first_name": "M",
            "last_name": "E",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Anonymous callers cannot reach identity-scoped routes.
    let (status, _) = send(&app, "GET", "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recipe_creation_validation() {
    let app = app();
    let token = register(&app, "alice").await;
    let flour = create_ingredient(&app, &token, "flour", "g").await;
    let tag = breakfast_tag_id(&app).await;

    // Duplicate ingredient in the submitted list
    let (status, body) = send_json(
        &app,
        "POST",
        "/recipes",
        Some(&token),
        Some(recipe_body("pancakes", &tag, &[(&flour, 200), (&flour, 100)])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("duplicate"));

    // Nothing was persisted by the rejected create.
    let (_, list) = send_json(&app, "GET", "/recipes", None, None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    // Non-positive amount
    let (status, _) = send_json(
        &app,
        "POST",
        "/recipes",
        Some(&token),
        Some(recipe_body("pancakes", &tag, &[(&flour, 0)])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown tag reference
    let (status, _) = send_json(
        &app,
        "POST",
        "/recipes",
        Some(&token),
        Some(recipe_body(
            "pancakes",
            "11111111-1111-1111-1111-111111111111",
            &[(&flour, 200)],
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Anonymous create
    let (status, _) = send_json(
        &app,
        "POST",
        "/recipes",
        None,
        Some(recipe_body("pancakes", &tag, &[(&flour, 200)])),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Duplicate (author, name) pair
    create_recipe(&app, &token, "pancakes", &tag, &[(&flour, 200)]).await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/recipes",
        Some(&token),
        Some(recipe_body("pancakes", &tag, &[(&flour, 100)])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_the_author_may_mutate() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let flour = create_ingredient(&app, &alice, "flour", "g").await;
    let tag = breakfast_tag_id(&app).await;
    let recipe = create_recipe(&app, &alice, "pancakes", &tag, &[(&flour, 200)]).await;

    let uri = format!("/recipes/{recipe}");
    let (status, _) = send_json(
        &app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({ "name": "stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unchanged after the rejected mutation
    let (_, body) = send_json(&app, "GET", &uri, None, None).await;
    assert_eq!(body["name"], "pancakes");

    let (status, body) = send_json(
        &app,
        "PATCH",
        &uri,
        Some(&alice),
        Some(json!({ "name": "thin pancakes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "thin pancakes");

    let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_cart_and_download() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let flour = create_ingredient(&app, &alice, "flour", "g").await;
    let egg = create_ingredient(&app, &alice, "egg", "pcs").await;
    let milk = create_ingredient(&app, &alice, "milk", "ml").await;
    let tag = breakfast_tag_id(&app).await;

    let a = create_recipe(&app, &alice, "recipe a", &tag, &[(&flour, 200), (&egg, 2)]).await;
    let b = create_recipe(&app, &alice, "recipe b", &tag, &[(&flour, 100), (&milk, 50)]).await;

    // Favorite: once 201, twice 409
    let fav = format!("/recipes/{a}/favorite");
    let (status, body) = send_json(&app, "POST", &fav, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "recipe a");
    let (status, _) = send_json(&app, "POST", &fav, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Scoped filter: anonymous is a 401, bob sees exactly his favorite
    let (status, _) = send(&app, "GET", "/recipes?is_favorited=true", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, list) =
        send_json(&app, "GET", "/recipes?is_favorited=true", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["is_favorited"], true);

    // Cart + download
    for recipe in [&a, &b] {
        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/recipes/{recipe}/shopping_cart"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, text) = send(
        &app,
        "GET",
        "/recipes/download_shopping_cart",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "egg: 2 pcs\nflour: 300 g\nmilk: 50 ml\n");

    // Remove: once 204, twice 404
    let cart = format!("/recipes/{a}/shopping_cart");
    let (status, _) = send(&app, "DELETE", &cart, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &cart, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unfavorite follows the same rules
    let (status, _) = send(&app, "DELETE", &fav, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &fav, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscriptions_flow() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let flour = create_ingredient(&app, &alice, "flour", "g").await;
    let tag = breakfast_tag_id(&app).await;
    create_recipe(&app, &alice, "recipe a", &tag, &[(&flour, 200)]).await;
    create_recipe(&app, &alice, "recipe b", &tag, &[(&flour, 100)]).await;

    let (_, me) = send_json(&app, "GET", "/users/me", Some(&alice), None).await;
    let alice_id = me["id"].as_str().unwrap().to_string();
    let (_, me) = send_json(&app, "GET", "/users/me", Some(&bob), None).await;
    let bob_id = me["id"].as_str().unwrap().to_string();

    // Self-follow is a validation error
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/users/{bob_id}/subscribe"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let sub = format!("/users/{alice_id}/subscribe");
    let (status, body) = send_json(&app, "POST", &sub, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["recipes_count"], 2);

    let (status, _) = send_json(&app, "POST", &sub, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // recipes_limit slices the displayed list, not the count
    let (status, subs) = send_json(
        &app,
        "GET",
        "/users/subscriptions?recipes_limit=1",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let subs = subs.as_array().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(subs[0]["recipes_count"], 2);
    assert_eq!(subs[0]["is_subscribed"], true);

    // Profile reflects the follow relation
    let (_, profile) = send_json(
        &app,
        "GET",
        &format!("/users/{alice_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(profile["is_subscribed"], true);

    let (status, _) = send(&app, "DELETE", &sub, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &sub, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipe_round_trip_preserves_fields() {
    let app = app();
    let alice = register(&app, "alice").await;
    let flour = create_ingredient(&app, &alice, "flour", "g").await;
    let egg = create_ingredient(&app, &alice, "egg", "pcs").await;
    let tag = breakfast_tag_id(&app).await;
    let id = create_recipe(&app, &alice, "pancakes", &tag, &[(&flour, 200), (&egg, 2)]).await;

    let (status, body) = send_json(&app, "GET", &format!("/recipes/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["name"], "pancakes");
    assert_eq!(body["cooking_time"], 20);
    assert_eq!(body["image"], "aGVsbG8=");
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["tags"][0]["id"], tag.as_str());

    let mut amounts: Vec<(String, i64)> = body["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| {
            (
                l["id"].as_str().unwrap().to_string(),
                l["amount"].as_i64().unwrap(),
            )
        })
        .collect();
    amounts.sort();
    let mut expected = vec![(flour, 200), (egg, 2)];
    expected.sort();
    assert_eq!(amounts, expected);

    // Anonymous view: identity flags default to false
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
}
