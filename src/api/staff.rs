use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::{ApiError, ApiResponse, AppState};
use crate::services::UserInfo;

#[derive(Debug, Deserialize)]
pub struct RolesRequest {
    pub roles: Vec<String>,
}

/// GET /staff
pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    current.require_staff()?;
    let staff = state.auth().list_staff().await?;
    Ok(Json(ApiResponse::success(
        staff.into_iter().map(UserInfo::from).collect(),
    )))
}

/// PUT /staff/{username}/roles
/// Replaces the whole role list. The superuser flag is not editable here.
pub async fn set_roles(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(username): Path<String>,
    Json(body): Json<RolesRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    current.require_superuser()?;

    let account = state.auth().set_staff_roles(&username, body.roles).await?;

    tracing::info!(
        username = %account.username,
        roles = ?account.staff_roles,
        changed_by = %current.0.username,
        "Staff roles updated"
    );

    Ok(Json(ApiResponse::success(account.into())))
}
