use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::observability::RequestActor;
use super::{ApiError, ApiResponse, AppState, MemberDto, MessageResponse};
use crate::db::Account;
use crate::services::{RegistrationRequest, ServiceError, UserInfo};

const SESSION_KEY: &str = "account_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub account: UserInfo,
    pub api_key: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub account: UserInfo,
    pub member: Option<MemberDto>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
}

#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// The authenticated account, attached to each protected request. It is the
/// actor recorded on every audit row the request writes.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0.id
    }

    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.0.is_superuser || !self.0.staff_roles.is_empty()
    }

    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Staff access required"))
        }
    }

    pub fn require_superuser(&self) -> Result<(), ApiError> {
        if self.0.is_superuser {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator access required"))
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(account_id)) = session.get::<i64>(SESSION_KEY).await
        && let Ok(account) = state.auth().account(account_id).await
        && account.is_active
    {
        return Ok(run_as(account, request, next).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(account)) = state.auth().verify_api_key(&key).await
    {
        return Ok(run_as(account, request, next).await);
    }

    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
}

/// Runs the rest of the stack as `account` and tags the response with the
/// actor so the request log can name who made the call.
async fn run_as(account: Account, mut request: Request, next: Next) -> Response {
    let actor = RequestActor {
        username: account.username.clone(),
        staff: account.is_superuser || !account.staff_roles.is_empty(),
    };
    request.extensions_mut().insert(CurrentAccount(account));

    let mut response = next.run(request).await;
    response.extensions_mut().insert(actor);
    response
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth()
        .login(payload.username.trim(), &payload.password)
        .await?;

    session
        .insert(SESSION_KEY, result.account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        account: result.account.into(),
        api_key: result.api_key,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// POST /auth/register
/// Public self-service application. The account stays inactive until approval.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberDto>>), ApiError> {
    let member = state.members().register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(member.into()))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let member = match state.members().get_by_account(current.id()).await {
        Ok(member) => Some(member.into()),
        Err(ServiceError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(ApiResponse::success(MeResponse {
        account: current.0.into(),
        member,
    })))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.current_password == payload.new_password {
        return Err(ApiError::validation(
            "New password must be different from current password",
        ));
    }

    state
        .auth()
        .change_password(current.id(), &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!(username = %current.0.username, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth().regenerate_api_key(current.id()).await?;

    tracing::info!(username = %current.0.username, "API key regenerated");

    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

/// POST /auth/forgot-password
/// Answers the same way whether or not the account exists.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    state.shared.password_reset.request(payload.username.trim()).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "If the account exists, a reset link has been sent",
    ))))
}

/// POST /auth/reset-password/verify
pub async fn verify_reset_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.shared.password_reset.verify(payload.token.trim()).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Token is valid",
    ))))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .password_reset
        .reset(payload.token.trim(), &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password has been reset",
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_api_key_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_static("abc"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer def"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_api_key_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer  def "));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("def"));

        headers.insert("Authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_api_key(&headers), None);
    }
}
