//! Inventory consistency and the domain flows around it: the parts-usage
//! transaction, leave review, visits and contracts.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use fieldops::config::Config;
use http_body_util::BodyExt;
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

fn authed_json(method: &str, uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/auth/login",
            "",
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

async fn create_employee(app: &Router, admin: &str, role: &str, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/employees",
            admin,
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

    login(app, username, "hunter2hunter2").await
}

async fn create_part(app: &Router, cookie: &str, part_number: &str, stock: i32, price: f64) -> String {
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/spare-parts",
            cookie,
            serde_json::json!({
                "name": format!("Part {part_number}"),
                "partNumber": part_number,
                "stock": stock,
                "price": price,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_task(app: &Router, cookie: &str, title: &str) -> String {
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/maintenance-tasks",
            cookie,
            serde_json::json!({ "title": title }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn part_stock(app: &Router, cookie: &str, part_id: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/spare-parts/{part_id}"), cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["stock"].as_i64().unwrap()
}

async fn task_total_cost(app: &Router, cookie: &str, task_id: &str) -> f64 {
    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            &format!("/api/maintenance-tasks/{task_id}"),
            cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["totalCost"]
        .as_f64()
        .unwrap()
}

#[tokio::test]
async fn parts_transaction_keeps_stock_and_cost_consistent() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let part_id = create_part(&app, &admin, "FLT-100", 10, 25.5).await;
    let task_id = create_task(&app, &admin, "Replace filter").await;

    // Consume 4 units
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            &format!("/api/maintenance-tasks/{task_id}/parts"),
            &admin,
            serde_json::json!({ "partId": part_id, "quantity": 4 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let usage_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    assert_eq!(part_stock(&app, &admin, &part_id).await, 6);
    let cost = task_total_cost(&app, &admin, &task_id).await;
    assert!((cost - 102.0).abs() < 1e-9, "4 x 25.5 = 102, got {cost}");

    // Over-consume: rejected, nothing changes
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            &format!("/api/maintenance-tasks/{task_id}/parts"),
            &admin,
            serde_json::json!({ "partId": part_id, "quantity": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(part_stock(&app, &admin, &part_id).await, 6);
    let cost = task_total_cost(&app, &admin, &task_id).await;
    assert!((cost - 102.0).abs() < 1e-9);

    // Remove the usage: stock restored, cost back to zero
    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/maintenance-tasks/{task_id}/parts/{usage_id}"),
            &admin,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(part_stock(&app, &admin, &part_id).await, 10);
    let cost = task_total_cost(&app, &admin, &task_id).await;
    assert!(cost.abs() < 1e-9);
}

#[tokio::test]
async fn parts_endpoint_validates_input() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let task_id = create_task(&app, &admin, "Validation task").await;

    // Zero quantity
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            &format!("/api/maintenance-tasks/{task_id}/parts"),
            &admin,
            serde_json::json!({ "partId": "whatever", "quantity": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown part
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            &format!("/api/maintenance-tasks/{task_id}/parts"),
            &admin,
            serde_json::json!({ "partId": "missing-part", "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inventory_mutations_are_role_gated() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let sales = create_employee(&app, &admin, "sales", "inv_sales").await;
    let technician = create_employee(&app, &admin, "maintenance", "inv_tech").await;

    // Sales may read parts but not create them
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/spare-parts", &sales))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/spare-parts",
            &sales,
            serde_json::json!({ "name": "Nope", "partNumber": "NOPE-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Maintenance staff can
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/spare-parts",
            &technician,
            serde_json::json!({ "name": "Belt", "partNumber": "BLT-7", "stock": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate part number conflicts
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/spare-parts",
            &technician,
            serde_json::json!({ "name": "Belt again", "partNumber": "BLT-7" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn leave_review_flow() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let sales = create_employee(&app, &admin, "sales", "leave_sales").await;

    // Sales files a request
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/leave-requests",
            &sales,
            serde_json::json!({
                "type": "annual",
                "startDate": "2026-09-01",
                "endDate": "2026-09-03",
                "reason": "Family trip",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    // Sales cannot approve their own request
    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/api/leave-requests/{request_id}/review"),
            &sales,
            serde_json::json!({ "status": "approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Manager approves with a note
    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/api/leave-requests/{request_id}/review"),
            &admin,
            serde_json::json!({ "status": "approved", "reviewNote": "Enjoy" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["reviewNote"], "Enjoy");

    // A bogus status is rejected
    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/api/leave-requests/{request_id}/review"),
            &admin,
            serde_json::json!({ "status": "maybe" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn visit_check_in_uses_session_identity() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let sales = create_employee(&app, &admin, "sales", "visit_sales").await;

    // Build a customer with one location
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/companies",
            &sales,
            serde_json::json!({
                "name": "Golden Spoon Group",
                "status": "existing",
                "locations": [{
                    "code": "GS-01",
                    "name": "Golden Spoon Sukhumvit",
                    "status": "active",
                    "address": "1 Sukhumvit Rd",
                    "district": "Watthana",
                    "province": "Bangkok",
                }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let location_id = body["data"]["locations"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Check in
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/visits",
            &sales,
            serde_json::json!({
                "locationId": location_id,
                "objectives": ["sales", "relationship"],
                "metOwner": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let visit_id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["checkOutTime"].is_null());
    assert_eq!(body["data"]["objectives"][0], "sales");

    // The caller's own visits include it; the employee id came from the
    // session, not the request body
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/visits", &sales))
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    // Check out stamps the time
    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/visits/{visit_id}/check-out"),
            &sales,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["checkOutTime"].is_string());

    // Unknown location is a 404
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/visits",
            &sales,
            serde_json::json!({ "locationId": "nowhere" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contract_lifecycle() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Customer + asset to attach
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/companies",
            &admin,
            serde_json::json!({ "name": "Blue Hotel", "status": "existing" }),
        ))
        .await
        .unwrap();
    let company_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/assets",
            &admin,
            serde_json::json!({ "serialNumber": "SN-1000", "modelName": "Espresso X" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let asset_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Create contract with the asset linked
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/contracts",
            &admin,
            serde_json::json!({
                "companyId": company_id,
                "contractNumber": "CT-2026-001",
                "startDate": "2026-01-01",
                "status": "active",
                "price": 12000.0,
                "assetIds": [asset_id],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let contract_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Duplicate contract number conflicts
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/contracts",
            &admin,
            serde_json::json!({
                "companyId": company_id,
                "contractNumber": "CT-2026-001",
                "startDate": "2026-02-01",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Detail carries the linked asset
    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/contracts/{contract_id}"), &admin))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["assetIds"][0].as_str().unwrap().is_empty(), false);
    assert_eq!(body["data"]["contractNumber"], "CT-2026-001");
}

#[tokio::test]
async fn clock_in_out_cycle() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let sales = create_employee(&app, &admin, "sales", "clock_sales").await;

    // Clock out before clocking in is refused
    let response = app
        .clone()
        .oneshot(authed("POST", "/api/activity-logs/clock-out", &sales))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/activity-logs/clock-in", &sales))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Double clock-in is refused
    let response = app
        .clone()
        .oneshot(authed("POST", "/api/activity-logs/clock-in", &sales))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/activity-logs/clock-out", &sales))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
