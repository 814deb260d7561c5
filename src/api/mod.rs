use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod activity;
pub mod auth;
pub mod companies;
pub mod contracts;
mod error;
pub mod employees;
pub mod leave;
pub mod maintenance;
mod observability;
pub mod rnd;
pub mod spare_parts;
pub mod system;
mod types;
pub mod visits;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<crate::config::Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn sessions(&self) -> &crate::auth::SessionCodec {
        &self.shared.sessions
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: crate::config::Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/me", put(auth::update_current_user))
        .route("/employees", get(employees::list_employees))
        .route("/employees", post(employees::create_employee))
        .route("/employees/{id}", get(employees::get_employee))
        .route("/employees/{id}", put(employees::update_employee))
        .route("/employees/{id}", delete(employees::delete_employee))
        .route("/companies", get(companies::list_companies))
        .route("/companies", post(companies::create_company))
        .route("/companies/{id}", get(companies::get_company))
        .route("/companies/{id}", put(companies::update_company))
        .route("/companies/{id}", delete(companies::delete_company))
        .route("/companies/{id}/locations", post(companies::add_location))
        .route("/visits", get(visits::list_visits))
        .route("/visits", post(visits::create_visit))
        .route("/visits/{id}/check-out", put(visits::check_out_visit))
        .route("/leave-requests", get(leave::list_leave_requests))
        .route("/leave-requests", post(leave::create_leave_request))
        .route("/leave-requests/{id}/review", put(leave::review_leave_request))
        .route("/leave-requests/{id}", delete(leave::delete_leave_request))
        .route("/spare-parts", get(spare_parts::list_parts))
        .route("/spare-parts", post(spare_parts::create_part))
        .route("/spare-parts/{id}", get(spare_parts::get_part))
        .route("/spare-parts/{id}", put(spare_parts::update_part))
        .route("/spare-parts/{id}", delete(spare_parts::delete_part))
        .route("/assets", get(spare_parts::list_assets))
        .route("/assets", post(spare_parts::create_asset))
        .route("/maintenance-tasks", get(maintenance::list_tasks))
        .route("/maintenance-tasks", post(maintenance::create_task))
        .route("/maintenance-tasks/{id}", get(maintenance::get_task))
        .route("/maintenance-tasks/{id}", put(maintenance::update_task))
        .route("/maintenance-tasks/{id}", delete(maintenance::delete_task))
        .route("/maintenance-tasks/{id}/parts", post(maintenance::add_part))
        .route(
            "/maintenance-tasks/{id}/parts/{usage_id}",
            delete(maintenance::remove_part),
        )
        .route("/contracts", get(contracts::list_contracts))
        .route("/contracts", post(contracts::create_contract))
        .route("/contracts/{id}", get(contracts::get_contract))
        .route("/contracts/{id}", put(contracts::update_contract))
        .route("/contracts/{id}", delete(contracts::delete_contract))
        .route("/rnd-tasks", get(rnd::list_tasks))
        .route("/rnd-tasks", post(rnd::create_task))
        .route("/rnd-tasks/{id}", get(rnd::get_task))
        .route("/rnd-tasks/{id}", put(rnd::update_task))
        .route("/rnd-tasks/{id}", delete(rnd::delete_task))
        .route("/activity-logs", get(activity::list_activity))
        .route("/activity-logs/clock-in", post(activity::clock_in))
        .route("/activity-logs/clock-out", post(activity::clock_out))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state, auth::session_gate))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}
