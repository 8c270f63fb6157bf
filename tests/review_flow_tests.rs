//! End-to-end coverage of the list/review gating rules: which watch-list
//! states allow a review, how ownership checks behave, and how reactions
//! and average ratings aggregate.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cinelog::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();

    let state = cinelog::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    cinelog::api::router(state)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Register a user and return their bearer token.
async fn register_and_login(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "securepassword123",
                "display_name": username,
                "bio": "Film enthusiast",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    login(app, username, "securepassword123").await
}

/// Create a film as admin and return its id.
async fn create_film(app: &Router, admin_token: &str, title: &str, status: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/films",
            Some(admin_token),
            serde_json::json!({
                "title": title,
                "synopsis": "synopsis",
                "status": status,
                "total_episodes": 12,
                "release_date": "2024-04-01",
                "genres": ["Drama"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn add_to_list(app: &Router, token: &str, film_id: i64, list_type: &str) -> StatusCode {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/user/list/{film_id}"),
            Some(token),
            serde_json::json!({ "list_type": list_type }),
        ))
        .await
        .unwrap()
        .status()
}

async fn post_review(app: &Router, token: &str, film_id: i64, rating: i32, comment: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/reviews/film/{film_id}"),
            Some(token),
            serde_json::json!({ "rating": rating, "comment": comment }),
        ))
        .await
        .unwrap()
}

async fn film_average(app: &Router, film_id: i64) -> f64 {
    let response = app
        .clone()
        .oneshot(get_request(&format!("/films/{film_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["data"]["average_rating"]
        .as_f64()
        .unwrap()
}

async fn reviews_of(app: &Router, film_id: i64) -> Vec<serde_json::Value> {
    let response = app
        .clone()
        .oneshot(get_request(&format!("/reviews/film/{film_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_unaired_film_only_accepts_plan_to_watch() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Upcoming Film", "not_yet_aired").await;

    let user = register_and_login(&app, "mika").await;

    for list_type in ["watching", "completed", "on_hold", "dropped"] {
        assert_eq!(
            add_to_list(&app, &user, film, list_type).await,
            StatusCode::BAD_REQUEST,
            "list_type {list_type} must be rejected for an unaired film"
        );
    }

    assert_eq!(
        add_to_list(&app, &user, film, "plan_to_watch").await,
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn test_list_validation_and_missing_film() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let user = register_and_login(&app, "mika").await;

    assert_eq!(
        add_to_list(&app, &user, film, "binging").await,
        StatusCode::BAD_REQUEST
    );

    assert_eq!(
        add_to_list(&app, &user, 9999, "watching").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_duplicate_list_entry_is_a_conflict() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let user = register_and_login(&app, "mika").await;

    assert_eq!(
        add_to_list(&app, &user, film, "watching").await,
        StatusCode::CREATED
    );
    assert_eq!(
        add_to_list(&app, &user, film, "completed").await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_update_list_status_skips_airing_gate() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Upcoming Film", "not_yet_aired").await;

    let user = register_and_login(&app, "mika").await;

    // No entry yet: update is a 404
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/user/list/{film}"),
            Some(&user),
            serde_json::json!({ "list_type": "watching" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        add_to_list(&app, &user, film, "plan_to_watch").await,
        StatusCode::CREATED
    );

    // The not-yet-aired gate applies only at creation; any label may
    // replace any other afterwards.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/user/list/{film}"),
            Some(&user),
            serde_json::json!({ "list_type": "watching" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Invalid label is still rejected on update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/user/list/{film}"),
            Some(&user),
            serde_json::json!({ "list_type": "binging" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The list reflects the change, joined with film data
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "username": "mika", "password": "securepassword123" }),
        ))
        .await
        .unwrap();
    let user_id = body_json(response).await["data"]["user"]["id"]
        .as_i64()
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/user/list/{user_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Upcoming Film");
    assert_eq!(entries[0]["film_status"], "not_yet_aired");
    assert_eq!(entries[0]["list_type"], "watching");
}

#[tokio::test]
async fn test_add_review_requires_list_entry() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let user = register_and_login(&app, "bea").await;

    let response = post_review(&app, &user, film, 5, "x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No review row was created, and the average is untouched
    assert!(reviews_of(&app, film).await.is_empty());
    assert_eq!(film_average(&app, film).await, 0.0);
}

#[tokio::test]
async fn test_add_review_rejects_plan_to_watch_entry() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let user = register_and_login(&app, "mika").await;
    assert_eq!(
        add_to_list(&app, &user, film, "plan_to_watch").await,
        StatusCode::CREATED
    );

    let response = post_review(&app, &user, film, 8, "looks promising").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(reviews_of(&app, film).await.is_empty());
}

#[tokio::test]
async fn test_add_review_rejects_unaired_film_even_with_entry() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Delayed Film", "airing").await;

    let user = register_and_login(&app, "mika").await;
    assert_eq!(
        add_to_list(&app, &user, film, "watching").await,
        StatusCode::CREATED
    );

    // The catalog pulls the film back to not_yet_aired after the entry
    // exists; the review gate re-reads the film's global status.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/films/{film}"),
            Some(&admin),
            serde_json::json!({
                "title": "Delayed Film",
                "synopsis": "synopsis",
                "status": "not_yet_aired",
                "total_episodes": 12,
                "release_date": "2030-01-01",
                "genres": ["Drama"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_review(&app, &user, film, 8, "too early").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(reviews_of(&app, film).await.is_empty());
}

#[tokio::test]
async fn test_review_validation() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let user = register_and_login(&app, "mika").await;
    assert_eq!(
        add_to_list(&app, &user, film, "watching").await,
        StatusCode::CREATED
    );

    // Missing comment
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/reviews/film/{film}"),
            Some(&user),
            serde_json::json!({ "rating": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing rating
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/reviews/film/{film}"),
            Some(&user),
            serde_json::json!({ "comment": "no rating" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Out-of-range ratings
    for rating in [0, 11, -3] {
        let response = post_review(&app, &user, film, rating, "rating bounds").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_review_lifecycle() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Great Film", "airing").await;

    let user = register_and_login(&app, "mika").await;
    assert_eq!(
        add_to_list(&app, &user, film, "watching").await,
        StatusCode::CREATED
    );

    let response = post_review(&app, &user, film, 8, "great").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 8);
    assert_eq!(reviews[0]["comment"], "great");
    assert_eq!(reviews[0]["username"], "mika");
    assert_eq!(film_average(&app, film).await, 8.0);

    // One review per (user, film)
    let response = post_review(&app, &user, film, 9, "changed my mind").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Editing is the sanctioned path
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/reviews/{review_id}"),
            Some(&user),
            serde_json::json!({ "rating": 9, "comment": "even better on rewatch" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews[0]["rating"], 9);
    assert_eq!(reviews[0]["comment"], "even better on rewatch");
    assert_eq!(film_average(&app, film).await, 9.0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/reviews/{review_id}"))
                .header("Authorization", format!("Bearer {user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(reviews_of(&app, film).await.is_empty());
    assert_eq!(film_average(&app, film).await, 0.0);

    // Gone means gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/reviews/{review_id}"))
                .header("Authorization", format!("Bearer {user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_ownership_is_ambiguous_to_others() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let alice = register_and_login(&app, "alice").await;
    assert_eq!(
        add_to_list(&app, &alice, film, "completed").await,
        StatusCode::CREATED
    );
    let response = post_review(&app, &alice, film, 7, "solid").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let bob = register_and_login(&app, "bob").await;

    // Bob updating or deleting Alice's review gets the same 404 as a
    // nonexistent review: existence is not leaked.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/reviews/{review_id}"),
            Some(&bob),
            serde_json::json!({ "rating": 1, "comment": "vandalism" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/reviews/{review_id}"))
                .header("Authorization", format!("Bearer {bob}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice's review is untouched
    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 7);
}

#[tokio::test]
async fn test_reaction_upsert_last_write_wins() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Some Film", "airing").await;

    let alice = register_and_login(&app, "alice").await;
    assert_eq!(
        add_to_list(&app, &alice, film, "completed").await,
        StatusCode::CREATED
    );
    let response = post_review(&app, &alice, film, 7, "solid").await;
    let review_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let bob = register_and_login(&app, "bob").await;

    let react = |reaction: &'static str| {
        let app = app.clone();
        let bob = bob.clone();
        async move {
            app.oneshot(json_request(
                "POST",
                &format!("/reviews/{review_id}/reaction"),
                Some(&bob),
                serde_json::json!({ "reaction": reaction }),
            ))
            .await
            .unwrap()
        }
    };

    // Invalid reaction value
    let response = react("love").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = react("like").await;
    assert_eq!(response.status(), StatusCode::OK);
    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews[0]["likes"], 1);
    assert_eq!(reviews[0]["dislikes"], 0);

    // like then dislike leaves exactly one row, holding the last write
    let response = react("dislike").await;
    assert_eq!(response.status(), StatusCode::OK);
    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews[0]["likes"], 0);
    assert_eq!(reviews[0]["dislikes"], 1);

    // Repeating the same reaction changes nothing
    let response = react("dislike").await;
    assert_eq!(response.status(), StatusCode::OK);
    let reviews = reviews_of(&app, film).await;
    assert_eq!(reviews[0]["likes"], 0);
    assert_eq!(reviews[0]["dislikes"], 1);

    // Reacting to a review that does not exist
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/reviews/9999/reaction",
            Some(&bob),
            serde_json::json!({ "reaction": "like" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_average_rating_is_mean_of_reviews() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let film = create_film(&app, &admin, "Divisive Film", "finished_airing").await;
    let unreviewed = create_film(&app, &admin, "Obscure Film", "finished_airing").await;

    let alice = register_and_login(&app, "alice").await;
    assert_eq!(
        add_to_list(&app, &alice, film, "completed").await,
        StatusCode::CREATED
    );
    let response = post_review(&app, &alice, film, 7, "decent").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let bob = register_and_login(&app, "bob").await;
    assert_eq!(
        add_to_list(&app, &bob, film, "completed").await,
        StatusCode::CREATED
    );
    let response = post_review(&app, &bob, film, 9, "loved it").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // [7, 9] -> 8.00
    assert_eq!(film_average(&app, film).await, 8.0);

    // No reviews -> 0.00
    assert_eq!(film_average(&app, unreviewed).await, 0.0);

    // Rounded to 2 decimal places: [7, 9, 7] -> 7.67
    let carol = register_and_login(&app, "carol").await;
    assert_eq!(
        add_to_list(&app, &carol, film, "completed").await,
        StatusCode::CREATED
    );
    let response = post_review(&app, &carol, film, 7, "fine").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(film_average(&app, film).await, 7.67);
}
