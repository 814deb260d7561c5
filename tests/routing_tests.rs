//! Session-gate behavior: redirects for unauthenticated traffic, role-based
//! routing for the admin area, and home-route dispatch from the site root.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use fieldops::config::Config;
use tower::ServiceExt;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password123";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
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

    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn sales_cookie(app: &Router) -> String {
    let admin_cookie = login(app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/employees")
                .header(header::COOKIE, &admin_cookie)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Somchai Sales",
                        "email": "somchai@fieldops.local",
                        "phone": "081-999-9999",
                        "role": "sales",
                        "username": "somchai",
                        "password": "hunter2hunter2",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    login(app, "somchai", "hunter2hunter2").await
}

fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location_of(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn unauthenticated_requests_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/", "/admin/dashboard", "/sale/dashboard", "/api/employees"] {
        let response = app
            .clone()
            .oneshot(get_with_cookie(uri, None))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::TEMPORARY_REDIRECT,
            "expected redirect for {uri}"
        );
        assert_eq!(location_of(&response), "/login", "for {uri}");
    }
}

#[tokio::test]
async fn garbage_cookie_is_treated_as_logged_out() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_with_cookie(
            "/admin/dashboard",
            Some("accessToken=not.a.token"),
        ))
        .await
        .unwrap();

    // Never an error, always plain "unauthenticated" handling
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/login");
}

#[tokio::test]
async fn login_page_passes_through_when_logged_out() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/login", None))
        .await
        .unwrap();

    // No redirect: the gate lets the request through to the (absent) page
    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn login_page_bounces_active_sessions_home() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/login", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/admin/dashboard");

    let sales = sales_cookie(&app).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/login", Some(&sales)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/sale/dashboard");
}

#[tokio::test]
async fn root_redirects_to_role_home() {
    let app = spawn_app().await;

    let sales = sales_cookie(&app).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/", Some(&sales)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/sale/dashboard");

    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/admin/dashboard");
}

#[tokio::test]
async fn admin_area_is_manager_only() {
    let app = spawn_app().await;

    let sales = sales_cookie(&app).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/admin/dashboard", Some(&sales)))
        .await
        .unwrap();

    // Bounced to their own dashboard, never served
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/sale/dashboard");

    // A manager passes the gate (the page itself does not exist in this
    // API-only build, so anything but a redirect is fine)
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/admin/dashboard", Some(&admin)))
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn sales_session_reaches_protected_api_but_not_manager_operations() {
    let app = spawn_app().await;
    let sales = sales_cookie(&app).await;

    // Protected read passes the gate and the handler
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/visits", Some(&sales)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Manager-only mutation is refused by the per-route check, not redirected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/employees/whoever")
                .header(header::COOKIE, &sales)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_paths_skip_the_gate() {
    let app = spawn_app().await;

    for uri in ["/favicon.ico", "/static/app.css", "/logo.png"] {
        let response = app
            .clone()
            .oneshot(get_with_cookie(uri, None))
            .await
            .unwrap();

        assert_ne!(
            response.status(),
            StatusCode::TEMPORARY_REDIRECT,
            "public path {uri} should not redirect"
        );
    }
}

#[tokio::test]
async fn logout_then_protected_request_redirects_to_login() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Browser dropped the cookie: the next protected request bounces
    let response = app
        .clone()
        .oneshot(get_with_cookie("/admin/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location_of(&response), "/login");
}
