use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use fieldops::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Bootstrap manager seeded by the initial migration.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password123";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = fieldops::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    fieldops::api::router(state).await
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn authed_json_request(
    method: &str,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Log in and return the session cookie pair (`accessToken=...`).
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set the session cookie")
        .to_str()
        .unwrap();

    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a second employee as admin and return a session cookie for them.
async fn create_and_login(app: &Router, admin_cookie: &str, role: &str) -> String {
    let username = format!("{role}_user");
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/employees",
            admin_cookie,
            serde_json::json!({
                "name": format!("Test {role}"),
                "email": format!("{username}@fieldops.local"),
                "phone": "081-000-0000",
                "role": role,
                "username": username,
                "password": "hunter2hunter2",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    login(app, &username, "hunter2hunter2").await
}

#[tokio::test]
async fn login_rejects_missing_fields() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "admin" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_does_not_leak_username_existence() {
    let app = spawn_app().await;

    // Known user, wrong password
    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": ADMIN_USERNAME, "password": "wrong" }),
        ))
        .await
        .unwrap();

    // Unknown user entirely
    let unknown_user = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "nobody", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Neither path sets a cookie
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());
    assert!(unknown_user.headers().get(header::SET_COOKIE).is_none());

    // And the response bodies are byte-identical: no enumeration signal
    let wrong_body = body_json(wrong_password).await;
    let unknown_body = body_json(unknown_user).await;
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn login_sets_http_only_cookie_and_strips_password() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("accessToken="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["redirectUrl"], "/admin/dashboard");
    assert_eq!(body["user"]["username"], ADMIN_USERNAME);
    assert_eq!(body["user"]["role"], "manager");
    // No credential material in the response
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn me_round_trip() {
    let app = spawn_app().await;

    // Without a cookie the endpoint refuses
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], ADMIN_USERNAME);
    assert_eq!(body["role"], "manager");
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/auth/logout", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("accessToken="));
    assert!(set_cookie.contains("Max-Age=0"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn tampered_cookie_is_rejected() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Flip a character near the end of the signature
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/auth/me", &tampered))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn employee_crud_requires_manager() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let sales_cookie = create_and_login(&app, &admin_cookie, "sales").await;

    // Sales can list but not create
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/employees", &sales_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/employees",
            &sales_cookie,
            serde_json::json!({
                "name": "Shadow Hire",
                "email": "shadow@fieldops.local",
                "phone": "081-111-1111",
                "role": "sales",
                "username": "shadow",
                "password": "hunter2hunter2",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Sales cannot delete either
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            "/api/employees/some-id",
            &sales_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Manager deletes a real employee
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/employees", &admin_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    let target = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["username"] == "sales_user")
        .expect("created employee should be listed")["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/employees/{target}"),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleting again is a 404
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/employees/{target}"),
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let payload = serde_json::json!({
        "name": "First",
        "email": "first@fieldops.local",
        "phone": "081-222-2222",
        "role": "rnd",
        "username": "duplicate_me",
        "password": "hunter2hunter2",
    });

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/employees",
            &admin_cookie,
            payload.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut second = payload;
    second["email"] = serde_json::json!("second@fieldops.local");
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/employees",
            &admin_cookie,
            second,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_role_is_rejected_at_creation() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/employees",
            &admin_cookie,
            serde_json::json!({
                "name": "Typo Role",
                "email": "typo@fieldops.local",
                "phone": "081-333-3333",
                "role": "manger",
                "username": "typo_role",
                "password": "hunter2hunter2",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
