use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState, EmployeeDto};
use crate::auth::policy::{Action, Role, allows, restricted_area};
use crate::auth::session::{self, Claims};
use crate::db::EmployeeUpdate;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: EmployeeDto,
    #[serde(rename = "redirectUrl")]
    pub redirect_url: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Paths served without a session: static assets and the auth endpoints
/// themselves (login must be reachable while logged out).
fn is_public_path(path: &str) -> bool {
    path.starts_with("/api/auth/")
        || path.starts_with("/static")
        || path == "/favicon.ico"
        || [".png", ".jpg", ".jpeg", ".gif", ".svg", ".css", ".js"]
            .iter()
            .any(|ext| path.ends_with(ext))
}

/// Session gate run once per inbound request, before any handler.
///
/// Decode failures are treated exactly like a missing cookie: the request is
/// classified as unauthenticated and redirected, never answered with an
/// error. Role-based routing keeps non-managers out of the admin area and
/// bounces the site root to the caller's dashboard.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(request).await;
    }

    let claims = session::token_from_headers(request.headers())
        .and_then(|token| state.sessions().decode(&token));

    if path == "/login" {
        return match claims {
            // Already logged in? Go to dashboard
            Some(claims) => Redirect::temporary(claims.role.home_route()).into_response(),
            None => next.run(request).await,
        };
    }

    let Some(claims) = claims else {
        return Redirect::temporary("/login").into_response();
    };

    tracing::Span::current().record("user_id", claims.username.as_str());

    if let Some(required) = restricted_area(&path)
        && claims.role != required
    {
        return Redirect::temporary(claims.role.home_route()).into_response();
    }

    if path == "/" {
        return Redirect::temporary(claims.role.home_route()).into_response();
    }

    next.run(request).await
}

// ============================================================================
// Per-route session helpers
// ============================================================================

/// Re-derive the session from the cookie. Handlers never trust the gate
/// alone; every protected operation starts here.
pub fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    session::token_from_headers(headers)
        .and_then(|token| state.sessions().decode(&token))
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

/// Check the caller's role against the capability table.
pub fn require_role(claims: &Claims, action: Action) -> Result<(), ApiError> {
    if allows(claims.role, action) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}

fn set_cookie(mut response: Response, cookie: &cookie::Cookie<'static>) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ApiError::internal(format!("Invalid cookie value: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Verify credentials and hand out the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Missing credentials"));
    }

    let employee = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    let role: Role = employee
        .role
        .parse()
        .map_err(|e| ApiError::internal(format!("Stored role is invalid: {e}")))?;

    let token = state
        .sessions()
        .issue(&employee.id, &employee.username, &employee.name, role)
        .map_err(|e| ApiError::internal(format!("Failed to issue session: {e}")))?;

    let secure = state.config().read().await.server.secure_cookies;
    let cookie = session::session_cookie(token, secure);

    tracing::info!("Login: {}", employee.username);

    let body = LoginResponse {
        success: true,
        redirect_url: role.home_route().to_string(),
        user: EmployeeDto::from(employee),
    };

    set_cookie(Json(body).into_response(), &cookie)
}

/// POST /api/auth/logout
/// Expire the session cookie. The token itself stays valid until its expiry
/// (stateless sessions); the browser just stops sending it.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let secure = state.config().read().await.server.secure_cookies;
    let cookie = session::clear_session_cookie(secure);

    let body = LogoutResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    };

    set_cookie((StatusCode::OK, Json(body)).into_response(), &cookie)
}

/// GET /api/auth/me
/// The caller's own identity, derived from the cookie.
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<EmployeeDto>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let employee = state.auth_service().current_user(&claims.sub).await?;

    Ok(Json(EmployeeDto::from(employee)))
}

/// PUT /api/auth/me
/// Update the caller's own profile.
pub async fn update_current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<EmployeeDto>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let update = EmployeeUpdate {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        password: payload.password,
        avatar: payload.avatar,
        ..EmployeeUpdate::default()
    };

    let employee = state
        .auth_service()
        .update_profile(&claims.sub, update)
        .await?;

    Ok(Json(EmployeeDto::from(employee)))
}
