// Integration tests for API endpoints.
// Tests marked #[ignore] need a running MongoDB instance:
//   cargo test --test api_test -- --ignored

use actix_web::{http::StatusCode, test, web, App};
use mongodb::bson::oid::ObjectId;
use pinboard::{
    api,
    assets::{AssetStore, DiskAssetStore},
    auth::{create_token, Claims},
    config::Config,
    db,
    models::{AuthResponse, FeedPage, LikeResponse},
};
use serde_json::json;
use std::sync::Arc;

/// Generate unique test identifier using nanoseconds for better uniqueness
fn generate_test_id() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string()
}

fn bearer_for(user_id: ObjectId, username: &str, config: &Config) -> String {
    let claims = Claims::new(user_id, username.to_string(), config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret).expect("token");
    format!("Bearer {}", token)
}

/// Helper function to create a test app
async fn create_test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = Config::from_env().expect("Failed to load configuration");
    let mongodb_db = db::create_mongodb_client(&config)
        .await
        .expect("Failed to create MongoDB client");
    let asset_store: Arc<dyn AssetStore> = Arc::new(
        DiskAssetStore::new(std::env::temp_dir().join("pinboard-test-uploads"))
            .expect("Failed to prepare asset storage"),
    );

    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(mongodb_db))
        .app_data(web::Data::from(asset_store))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(api::auth::register))
                        .route("/login", web::post().to(api::auth::login)),
                )
                .route("/feed", web::get().to(api::pins::get_feed))
                .service(
                    web::scope("/pins")
                        .route("", web::post().to(api::pins::create_pin))
                        .route("/{pin_id}", web::get().to(api::pins::get_pin))
                        .route("/{pin_id}/like", web::post().to(api::pins::toggle_like))
                        .route("/{pin_id}/comment", web::post().to(api::pins::add_comment)),
                )
                .service(
                    web::scope("/users")
                        .route("/{username}", web::get().to(api::users::get_profile))
                        .route(
                            "/{user_id}/follow",
                            web::post().to(api::users::toggle_follow),
                        ),
                ),
        )
}

// ---- Tests that run without any backing services ----

#[actix_web::test]
async fn test_register_rejects_short_username() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "ab",
            "email": "ab@example.com",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Username"));
}

#[actix_web::test]
async fn test_register_rejects_invalid_email() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "validname",
            "email": "not-an-email",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_rejects_short_password() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "validname",
            "email": "valid@example.com",
            "password": "short"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_like_without_token_is_json_401_for_fetch_callers() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/like", ObjectId::new().to_hex()))
        .insert_header(("Accept", "application/json"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_like_without_token_redirects_browser_navigations() {
    let app = test::init_service(create_test_app().await).await;

    // No Accept/X-Requested-With marker: this is a plain form post.
    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/like", ObjectId::new().to_hex()))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("Location").unwrap().to_str().unwrap(),
        "/login"
    );
}

#[actix_web::test]
async fn test_empty_comment_is_rejected_before_any_database_work() {
    let app = test::init_service(create_test_app().await).await;
    let config = Config::from_env().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/comment", ObjectId::new().to_hex()))
        .insert_header(("Authorization", bearer_for(ObjectId::new(), "tester", &config)))
        .insert_header(("Accept", "application/json"))
        .set_json(json!({ "text": "   \n  " }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Comment"));
}

#[actix_web::test]
async fn test_follow_yourself_is_rejected() {
    let app = test::init_service(create_test_app().await).await;
    let config = Config::from_env().unwrap();
    let user_id = ObjectId::new();

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", user_id.to_hex()))
        .insert_header(("Authorization", bearer_for(user_id, "selfie", &config)))
        .insert_header(("Accept", "application/json"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You cannot follow yourself");
}

// ---- Tests that need a running MongoDB ----

#[actix_web::test]
#[ignore = "requires a running MongoDB"]
async fn test_register_and_login() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let username = format!("user{}", &test_id[..12]);
    let email = format!("user{}@example.com", test_id);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: AuthResponse = test::read_body_json(resp).await;
    assert!(!body.token.is_empty());
    assert_eq!(body.user.username, username);

    // Login with the username as identifier.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "identifier": username,
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // And again with the email.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "identifier": email,
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[ignore = "requires a running MongoDB"]
async fn test_duplicate_registration_conflicts() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let payload = json!({
        "username": format!("dup{}", &test_id[..12]),
        "email": format!("dup{}@example.com", test_id),
        "password": "password123"
    });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

/// Request payload for a fresh unique account.
fn registration_payload() -> serde_json::Value {
    let test_id = generate_test_id();
    json!({
        "username": format!("u{}", &test_id[..14]),
        "email": format!("u{}@example.com", test_id),
        "password": "password123"
    })
}

fn multipart_pin_body(boundary: &str, title: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n",
            b = boundary,
            title = title
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\xff\xd8\xff\xe0fake-jpeg-bytes");
    body.extend_from_slice(format!("\r\n--{b}--\r\n", b = boundary).as_bytes());
    body
}

#[actix_web::test]
#[ignore = "requires a running MongoDB"]
async fn test_upload_like_toggle_and_comment_flow() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(registration_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;

    // Upload a pin.
    let boundary = "----pinboardtestboundary";
    let req = test::TestRequest::post()
        .uri("/api/pins")
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .insert_header(("Accept", "application/json"))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_pin_body(boundary, "Harbor at dusk"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let pin: serde_json::Value = test::read_body_json(resp).await;
    let pin_id = pin["id"].as_str().unwrap().to_string();

    // Like it: count goes to 1.
    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/like", pin_id))
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .insert_header(("Accept", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let like: LikeResponse = test::read_body_json(resp).await;
    assert!(like.success);
    assert!(like.liked);
    assert_eq!(like.like_count, 1);

    // Toggle again: back to the original state.
    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/like", pin_id))
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .insert_header(("Accept", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let like: LikeResponse = test::read_body_json(resp).await;
    assert!(!like.liked);
    assert_eq!(like.like_count, 0);

    // Comment on it.
    let req = test::TestRequest::post()
        .uri(&format!("/api/pins/{}/comment", pin_id))
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .insert_header(("Accept", "application/json"))
        .set_json(json!({ "text": "lovely light" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["comment"]["text"], "lovely light");
    assert_eq!(body["comment_count"], 1);

    // The detail view reflects both mutations.
    let req = test::TestRequest::get()
        .uri(&format!("/api/pins/{}", pin_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(detail["comment_count"], 1);
    assert_eq!(detail["like_count"], 0);
}

#[actix_web::test]
#[ignore = "requires a running MongoDB"]
async fn test_follow_toggle_updates_both_sides() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(registration_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let alice: AuthResponse = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(registration_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bob: AuthResponse = test::read_body_json(resp).await;

    // Alice follows Bob.
    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", bob.user.id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .insert_header(("Accept", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["following"], true);
    assert_eq!(body["follower_count"], 1);

    // Bob's profile shows the follower, personalized for Alice.
    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", bob.user.username))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["follower_count"], 1);
    assert_eq!(profile["is_following"], true);

    // Toggle off.
    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/follow", bob.user.id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .insert_header(("Accept", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["following"], false);
    assert_eq!(body["follower_count"], 0);
}

#[actix_web::test]
#[ignore = "requires a running MongoDB"]
async fn test_feed_carries_pagination_envelope() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::get()
        .uri("/api/feed?page=1&limit=10")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let page: FeedPage = test::read_body_json(resp).await;
    assert!(page.posts.len() <= 10);
    assert_eq!(page.pagination.current_page, 1);
    assert!(page.pagination.total_pages >= 1);
}
